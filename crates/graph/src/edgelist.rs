//! Plain-text edge lists.
//!
//! One `u v` pair per line, whitespace separated, each undirected edge once.
//! This is the format `networkx.read_edgelist` understands.

use crate::{ContactGraph, GraphError};
use sirsim_types::NodeIndex;
use std::fs;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::debug;

impl ContactGraph {
    /// Write every undirected edge once, as `u v` with `u < v`.
    pub fn write_edgelist<W: Write>(&self, writer: W) -> Result<(), GraphError> {
        let mut out = BufWriter::new(writer);
        for u in 0..self.node_count() as NodeIndex {
            for &v in self.neighbors(u) {
                if u < v {
                    writeln!(out, "{u} {v}")?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Write the edge list to `path`, creating parent directories.
    pub fn save_edgelist(&self, path: &Path) -> Result<(), GraphError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        self.write_edgelist(file)?;
        debug!(path = %path.display(), edges = self.edge_count(), "Wrote edge list");
        Ok(())
    }

    /// Parse an edge list.
    ///
    /// Blank lines and lines starting with `#` are ignored; extra columns
    /// (e.g. networkx edge data) are ignored. The node count is `node_count`
    /// if given, otherwise one more than the largest index seen.
    pub fn read_edgelist<R: BufRead>(
        reader: R,
        node_count: Option<usize>,
    ) -> Result<Self, GraphError> {
        let mut edges = Vec::new();
        let mut max_index: Option<u64> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let u = parse_endpoint(fields.next(), line_no)?;
            let v = parse_endpoint(fields.next(), line_no)?;
            max_index = Some(max_index.unwrap_or(0).max(u).max(v));
            edges.push((u, v));
        }

        let n = match (node_count, max_index) {
            (Some(n), _) => n,
            (None, Some(max)) => max as usize + 1,
            (None, None) => 0,
        };

        let mut converted = Vec::with_capacity(edges.len());
        for (u, v) in edges {
            match (NodeIndex::try_from(u), NodeIndex::try_from(v)) {
                (Ok(a), Ok(b)) => converted.push((a, b)),
                _ => return Err(GraphError::InvalidEdge { u, v, n }),
            }
        }
        Self::from_edges(n, &converted)
    }

    /// Read an edge list from `path`.
    pub fn load_edgelist(path: &Path, node_count: Option<usize>) -> Result<Self, GraphError> {
        let file = fs::File::open(path)?;
        let graph = Self::read_edgelist(std::io::BufReader::new(file), node_count)?;
        debug!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Loaded edge list"
        );
        Ok(graph)
    }
}

fn parse_endpoint(field: Option<&str>, line: usize) -> Result<u64, GraphError> {
    let field = field.ok_or_else(|| GraphError::Parse {
        line,
        message: "expected two node indices".to_string(),
    })?;
    field.parse::<u64>().map_err(|e| GraphError::Parse {
        line,
        message: format!("invalid node index {field:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_write_lists_each_edge_once() {
        let g = ContactGraph::from_edges(4, &[(1, 0), (1, 2), (3, 2)]).unwrap();
        let mut buf = Vec::new();
        g.write_edgelist(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "0 1\n1 2\n2 3\n");
    }

    #[test]
    fn test_read_skips_comments_and_extra_columns() {
        let input = "# header\n0 1 {}\n\n2 1\n";
        let g = ContactGraph::read_edgelist(Cursor::new(input), None).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(1), &[0, 2]);
    }

    #[test]
    fn test_read_with_explicit_node_count() {
        let g = ContactGraph::read_edgelist(Cursor::new("0 1\n"), Some(5)).unwrap();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.degree(4), 0);
    }

    #[test]
    fn test_read_rejects_malformed_lines() {
        let err = ContactGraph::read_edgelist(Cursor::new("0 1\n2\n"), None).unwrap_err();
        assert!(matches!(err, GraphError::Parse { line: 2, .. }));

        let err = ContactGraph::read_edgelist(Cursor::new("0 x\n"), None).unwrap_err();
        assert!(matches!(err, GraphError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_rejects_edges_beyond_node_count() {
        let err = ContactGraph::read_edgelist(Cursor::new("0 4\n"), Some(3)).unwrap_err();
        assert!(matches!(err, GraphError::InvalidEdge { u: 0, v: 4, n: 3 }));
    }

    #[test]
    fn test_empty_input_gives_empty_graph() {
        let g = ContactGraph::read_edgelist(Cursor::new(""), None).unwrap();
        assert!(g.is_empty());
    }
}
