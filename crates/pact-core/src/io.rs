//! graph6 / sparse6 / directed byte-format codecs (§6).
//!
//! graph6 and sparse6 are the standard small-graph byte encodings; decoding
//! must match the published format byte-for-byte since fixtures and basis
//! graphs round-trip through it. The "directed" format is PACT's own:
//! `nv ne u0 v0 u1 v1 …`, whitespace separated.

use crate::error::CoreError;
use crate::graph::Graph;
use crate::id::VertexId;

const G6_HEADER: &str = ">>graph6<<";
const S6_HEADER: &str = ">>sparse6<<";

fn strip_header<'a>(bytes: &'a [u8], header: &str) -> &'a [u8] {
    bytes.strip_prefix(header.as_bytes()).unwrap_or(bytes)
}

fn trim_trailing_newline(bytes: &[u8]) -> &[u8] {
    let mut b = bytes;
    if b.last() == Some(&b'\n') {
        b = &b[..b.len() - 1];
    }
    if b.last() == Some(&b'\r') {
        b = &b[..b.len() - 1];
    }
    b
}

/// Decodes the `N(n)` vertex-count prefix, returning `(n, rest-of-input)`.
fn decode_n(bytes: &[u8]) -> Result<(usize, &[u8]), CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::DecodingError { reason: "empty graph6/sparse6 body".into() });
    }
    if bytes[0] != 126 {
        let n = decode_byte(bytes[0])?;
        return Ok((n, &bytes[1..]));
    }
    if bytes.len() >= 2 && bytes[1] == 126 {
        if bytes.len() < 8 {
            return Err(CoreError::DecodingError { reason: "truncated 36-bit N(n)".into() });
        }
        let n = decode_6bit_group(&bytes[2..8])?;
        return Ok((n, &bytes[8..]));
    }
    if bytes.len() < 4 {
        return Err(CoreError::DecodingError { reason: "truncated 18-bit N(n)".into() });
    }
    let n = decode_6bit_group(&bytes[1..4])?;
    Ok((n, &bytes[4..]))
}

fn decode_byte(b: u8) -> Result<usize, CoreError> {
    (b as usize)
        .checked_sub(63)
        .ok_or_else(|| CoreError::DecodingError { reason: format!("byte {b} below 63") })
}

fn decode_6bit_group(bytes: &[u8]) -> Result<usize, CoreError> {
    let mut n = 0usize;
    for &b in bytes {
        n = (n << 6) | decode_byte(b)?;
    }
    Ok(n)
}

fn encode_n(n: usize) -> Vec<u8> {
    if n <= 62 {
        vec![(n + 63) as u8]
    } else if n <= 258_047 {
        let mut out = vec![126u8];
        out.extend(encode_6bit_group(n, 3));
        out
    } else {
        let mut out = vec![126u8, 126u8];
        out.extend(encode_6bit_group(n, 6));
        out
    }
}

fn encode_6bit_group(n: usize, groups: usize) -> Vec<u8> {
    (0..groups)
        .rev()
        .map(|i| (((n >> (i * 6)) & 0x3f) + 63) as u8)
        .collect()
}

/// Reads a stream of single bits out of a graph6/sparse6 body: each byte
/// holds six bits (value - 63), read most-significant-bit first.
struct BitReader<'a> {
    bytes: &'a [u8],
    byte_idx: usize,
    bit_idx: u8,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, byte_idx: 0, bit_idx: 0 }
    }

    fn next_bit(&mut self) -> Result<u8, CoreError> {
        if self.byte_idx >= self.bytes.len() {
            return Err(CoreError::DecodingError { reason: "unexpected end of bit stream".into() });
        }
        let value = decode_byte(self.bytes[self.byte_idx])?;
        if value > 63 {
            return Err(CoreError::DecodingError { reason: format!("byte value {value} out of range") });
        }
        let bit = (value >> (5 - self.bit_idx)) & 1;
        self.bit_idx += 1;
        if self.bit_idx == 6 {
            self.bit_idx = 0;
            self.byte_idx += 1;
        }
        Ok(bit as u8)
    }

    fn next_bits(&mut self, k: usize) -> Result<usize, CoreError> {
        let mut v = 0usize;
        for _ in 0..k {
            v = (v << 1) | self.next_bit()? as usize;
        }
        Ok(v)
    }
}

fn pack_bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bits.len() {
        let mut group = 0u8;
        for b in 0..6 {
            group = (group << 1) | bits.get(i + b).copied().unwrap_or(0);
        }
        out.push(group + 63);
        i += 6;
    }
    out
}

fn push_bits(bits: &mut Vec<u8>, value: usize, k: usize) {
    for i in (0..k).rev() {
        bits.push(((value >> i) & 1) as u8);
    }
}

fn sparse6_bit_width(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - ((n - 1) as u32).leading_zeros()) as usize
    }
}

/// Decodes a graph6 byte string (with or without the `>>graph6<<` header).
pub fn decode_graph6(input: &[u8]) -> Result<Graph, CoreError> {
    let body = trim_trailing_newline(strip_header(input, G6_HEADER));
    let (n, bit_body) = decode_n(body)?;
    let mut g = Graph::new(false);
    g.add_n_vertices(n);
    let mut reader = BitReader::new(bit_body);
    for j in 1..n {
        for i in 0..j {
            if reader.next_bit()? == 1 {
                g.add_edge(VertexId(i as u32), VertexId(j as u32))
                    .map_err(|e| CoreError::DecodingError { reason: e.to_string() })?;
            }
        }
    }
    Ok(g)
}

/// Encodes an undirected graph as graph6 (no header, no trailing newline).
pub fn encode_graph6(g: &Graph) -> Result<Vec<u8>, CoreError> {
    if g.directed() {
        return Err(CoreError::DecodingError { reason: "graph6 does not support directed graphs".into() });
    }
    let n = g.vertex_count();
    let adjacency: std::collections::HashSet<(u32, u32)> =
        g.edges().map(|(a, b)| if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) }).collect();

    let mut bits = Vec::with_capacity(n * n / 2);
    for j in 1..n {
        for i in 0..j {
            bits.push(adjacency.contains(&(i as u32, j as u32)) as u8);
        }
    }
    let mut out = encode_n(n);
    out.extend(pack_bits_to_bytes(&bits));
    Ok(out)
}

/// Decodes a sparse6 byte string (with or without the `>>sparse6<<` header).
pub fn decode_sparse6(input: &[u8]) -> Result<Graph, CoreError> {
    let body = trim_trailing_newline(strip_header(input, S6_HEADER));
    let body = body
        .strip_prefix(b":")
        .ok_or_else(|| CoreError::DecodingError { reason: "sparse6 body missing ':' marker".into() })?;
    let (n, rest) = decode_n(body)?;
    let k = sparse6_bit_width(n);
    let mut g = Graph::new(false);
    g.add_n_vertices(n);

    let mut reader = BitReader::new(rest);
    let mut v: i64 = 0;
    loop {
        let b = match reader.next_bit() {
            Ok(b) => b,
            Err(_) => break,
        };
        let x = match reader.next_bits(k) {
            Ok(x) => x as i64,
            Err(_) => break,
        };
        if b == 1 {
            v += 1;
        }
        if x >= n as i64 {
            break;
        }
        if x > v {
            v = x;
        } else {
            g.add_edge(VertexId(x as u32), VertexId(v as u32))
                .map_err(|e| CoreError::DecodingError { reason: e.to_string() })?;
        }
    }
    Ok(g)
}

/// Encodes an undirected graph as sparse6 (includes the leading `:` marker).
pub fn encode_sparse6(g: &Graph) -> Result<Vec<u8>, CoreError> {
    if g.directed() {
        return Err(CoreError::DecodingError { reason: "sparse6 does not support directed graphs".into() });
    }
    let n = g.vertex_count();
    let k = sparse6_bit_width(n);

    let mut edges: Vec<(i64, i64)> = g
        .edges()
        .map(|(a, b)| {
            let (a, b) = (a.0 as i64, b.0 as i64);
            if a <= b { (a, b) } else { (b, a) }
        })
        .collect();
    edges.sort_by_key(|&(x, y)| (y, x));

    let mut bits = Vec::new();
    let mut v: i64 = 0;
    for (x, y) in edges {
        if y == v {
            bits.push(0);
            push_bits(&mut bits, x as usize, k);
        } else if y == v + 1 {
            v += 1;
            bits.push(1);
            push_bits(&mut bits, x as usize, k);
        } else {
            v = y;
            bits.push(1);
            push_bits(&mut bits, y as usize, k);
            bits.push(0);
            push_bits(&mut bits, x as usize, k);
        }
    }
    while !bits.is_empty() && bits.len() % 6 != 0 {
        bits.push(1);
    }

    let mut out = vec![b':'];
    out.extend(encode_n(n));
    out.extend(pack_bits_to_bytes(&bits));
    Ok(out)
}

/// Decodes PACT's internal directed fixture format: `nv ne u0 v0 u1 v1 …`.
pub fn decode_directed(input: &str) -> Result<Graph, CoreError> {
    let mut tokens = input.split_whitespace();
    let missing = || CoreError::DecodingError { reason: "truncated directed-format input".into() };
    let bad_int = |s: &str| CoreError::DecodingError { reason: format!("not an integer: {s}") };

    let nv: usize = tokens.next().ok_or_else(missing).and_then(|s| s.parse().map_err(|_| bad_int(s)))?;
    let ne: usize = tokens.next().ok_or_else(missing).and_then(|s| s.parse().map_err(|_| bad_int(s)))?;

    let mut g = Graph::new(true);
    g.add_n_vertices(nv);
    for _ in 0..ne {
        let u: u32 = tokens.next().ok_or_else(missing).and_then(|s| s.parse().map_err(|_| bad_int(s)))?;
        let v: u32 = tokens.next().ok_or_else(missing).and_then(|s| s.parse().map_err(|_| bad_int(s)))?;
        g.add_edge(VertexId(u), VertexId(v)).map_err(|e| CoreError::DecodingError { reason: e.to_string() })?;
    }
    if tokens.next().is_some() {
        return Err(CoreError::DecodingError { reason: "trailing tokens after declared edge count".into() });
    }
    Ok(g)
}

/// Encodes a directed graph as PACT's internal directed fixture format.
pub fn encode_directed(g: &Graph) -> String {
    let mut parts = vec![g.vertex_count().to_string(), g.edge_count().to_string()];
    for (u, v) in g.edges() {
        parts.push(u.0.to_string());
        parts.push(v.0.to_string());
    }
    parts.join(" ")
}

impl Graph {
    pub fn from_graph6(input: &[u8]) -> Result<Graph, CoreError> {
        decode_graph6(input)
    }

    pub fn to_graph6(&self) -> Result<Vec<u8>, CoreError> {
        encode_graph6(self)
    }

    pub fn from_sparse6(input: &[u8]) -> Result<Graph, CoreError> {
        decode_sparse6(input)
    }

    pub fn to_sparse6(&self) -> Result<Vec<u8>, CoreError> {
        encode_sparse6(self)
    }

    pub fn from_directed_format(input: &str) -> Result<Graph, CoreError> {
        decode_directed(input)
    }

    pub fn to_directed_format(&self) -> String {
        encode_directed(self)
    }
}
