//! Computation-graph representation for the external spatial-modeler engine.
//!
//! A graph is an ordered list of nodes: global settings, typed raster/table/
//! scalar declarations, table and scalar assignments, named `#define`
//! expressions, and assignments, exactly one of which is the terminal write
//! into the declared output raster. The engine's job-description quirks
//! (keyword casing, the missing space before some quoted paths, the spacing
//! inside option strings) live in the per-node option constants and in
//! `serialize`, nowhere else.

use std::path::PathBuf;

/// Text between `PUBINPUT`/`PUBOUT` and the opening path quote, spacing
/// included. The engine contract is sensitive to these literals.
pub mod options {
    /// DN stack inputs: resampled, no AOI, edge fill, no space before the quote.
    pub const STACK_INPUT: &str = " NEAREST NEIGHBOR AOI NONE EDGE FILL";
    /// Calibrated inputs read whole: a single space before the quote.
    pub const PLAIN_INPUT: &str = " ";
    /// Index inputs: resampled, no AOI, space before the quote.
    pub const RESAMPLED_INPUT: &str = " NEAREST NEIGHBOR AOI NONE ";

    /// Integer stack outputs; the storage keyword is appended per family.
    pub const STACK_OUTPUT: &str = " USEALL ATHEMATIC ";
    /// Float outputs ignoring zero (TOA reflectance).
    pub const FLOAT_IGNORE_ZERO_OUTPUT: &str = " IGNORE 0 ATHEMATIC FLOAT SINGLE ";
    /// Float outputs keeping all values (indices).
    pub const FLOAT_OUTPUT: &str = " USEALL ATHEMATIC FLOAT SINGLE ";
}

/// One node of the job description.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Global engine setting, e.g. `SET CELLSIZE MIN`.
    Setting(&'static str),
    /// Declared input raster.
    RasterInput {
        keyword: &'static str,
        name: String,
        options: &'static str,
        path: PathBuf,
    },
    /// Declared output raster; its assignment is the terminal write.
    RasterOutput {
        keyword: &'static str,
        name: String,
        disposition: &'static str,
        options: String,
        path: PathBuf,
    },
    /// Unbound intermediate raster.
    RasterTemp { name: String },
    /// Fixed-length float table declaration.
    TableDecl { name: &'static str, len: usize },
    /// Float scalar declaration.
    ScalarDecl { name: &'static str },
    /// Table constant assignment.
    TableAssign { name: &'static str, values: Vec<f64> },
    /// Scalar constant assignment.
    ScalarAssign { name: &'static str, value: f64 },
    /// Named expression (`#define`), no trailing semicolon.
    Define { name: String, expr: String },
    /// Plain assignment; the one targeting the output raster is terminal.
    Assign { target: String, expr: String },
}

/// A job description: ordered nodes plus the `QUIT;` terminator added at
/// serialization time.
#[derive(Debug, Clone, Default)]
pub struct ComputationGraph {
    nodes: Vec<Node>,
}

impl ComputationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of declared input raster nodes.
    pub fn input_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::RasterInput { .. }))
            .count()
    }

    /// Serialize into the engine's first-stage job file text, ending with
    /// the `QUIT;` terminator.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let line = match node {
                Node::Setting(s) => format!("{s};"),
                Node::RasterInput {
                    keyword,
                    name,
                    options,
                    path,
                } => format!(
                    "{keyword} RASTER {name} FILE OLD PUBINPUT{options}\"{}\";",
                    path.display()
                ),
                Node::RasterOutput {
                    keyword,
                    name,
                    disposition,
                    options,
                    path,
                } => format!(
                    "{keyword} RASTER {name} FILE {disposition} PUBOUT{options}\"{}\";",
                    path.display()
                ),
                Node::RasterTemp { name } => format!("Float RASTER {name};"),
                Node::TableDecl { name, len } => format!("FLOAT TABLE {name} [{len}];"),
                Node::ScalarDecl { name } => format!("FLOAT SCALAR {name};"),
                Node::TableAssign { name, values } => {
                    let joined = values
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{name} = TABLE({joined});")
                }
                Node::ScalarAssign { name, value } => format!("{name} = {value};"),
                Node::Define { name, expr } => format!("#define {name} {expr}"),
                Node::Assign { target, expr } => format!("{target} = {expr};"),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("QUIT;\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_declarations_in_order_with_terminator() {
        let mut graph = ComputationGraph::new();
        graph
            .push(Node::Setting("SET CELLSIZE MIN"))
            .push(Node::RasterInput {
                keyword: "INTEGER",
                name: "n1".into(),
                options: options::STACK_INPUT,
                path: PathBuf::from("/data/scene_b1.tif"),
            })
            .push(Node::TableDecl {
                name: "ESUN_values",
                len: 6,
            })
            .push(Node::TableAssign {
                name: "ESUN_values",
                values: vec![2067.0, 1893.0, 1603.0, 972.6, 245.0, 79.72],
            })
            .push(Node::Assign {
                target: "n8".into(),
                expr: "STACKLAYERS (n1)".into(),
            });

        let text = graph.serialize();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SET CELLSIZE MIN;");
        assert_eq!(
            lines[1],
            "INTEGER RASTER n1 FILE OLD PUBINPUT NEAREST NEIGHBOR AOI NONE EDGE FILL\"/data/scene_b1.tif\";"
        );
        assert_eq!(lines[2], "FLOAT TABLE ESUN_values [6];");
        assert_eq!(lines[3], "ESUN_values = TABLE(2067, 1893, 1603, 972.6, 245, 79.72);");
        assert_eq!(lines[4], "n8 = STACKLAYERS (n1);");
        assert_eq!(lines[5], "QUIT;");
    }

    #[test]
    fn float_values_render_without_trailing_zeros() {
        let mut graph = ComputationGraph::new();
        graph.push(Node::ScalarAssign {
            name: "distance",
            value: 1.0,
        });
        graph.push(Node::ScalarAssign {
            name: "sun_elev",
            value: 48.36084282,
        });
        let text = graph.serialize();
        assert!(text.contains("distance = 1;"));
        assert!(text.contains("sun_elev = 48.36084282;"));
    }

    #[test]
    fn input_count_counts_only_inputs() {
        let mut graph = ComputationGraph::new();
        for i in 1..=7 {
            graph.push(Node::RasterInput {
                keyword: "INTEGER",
                name: format!("n{i}"),
                options: options::STACK_INPUT,
                path: PathBuf::from(format!("/data/b{i}.tif")),
            });
        }
        graph.push(Node::RasterOutput {
            keyword: "INTEGER",
            name: "n8".into(),
            disposition: "DELETE_IF_EXISTING",
            options: format!("{}16 BIT UNSIGNED INTEGER", options::STACK_OUTPUT),
            path: PathBuf::from("/out/stack.img"),
        });
        assert_eq!(graph.input_count(), 7);
    }
}
