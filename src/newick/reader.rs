use crate::model::{Height, NodeId, RootedTree, TimeTree};
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};

/// Newick label delimiters: parentheses, comma, colon, semicolon, whitespace, comment start
const NEWICK_LABEL_DELIMITERS: &[u8] = b"([,:; \n\t\r)]";

/// Default guess for number of leaves, when unknown
const DEFAULT_NUM_LEAVES_GUESS: usize = 10;

/// Reader for binary Newick strings into [TimeTree]s.
///
/// Newick stores branch lengths, a time tree stores heights. The reader keeps
/// every branch length and places the deepest leaf at height zero, so trees
/// with tips sampled at different times get positive leaf heights.
///
/// Every non-root vertex needs a branch length; the root's is ignored.
///
/// # Example
/// ```
/// use flexclock::model::RootedTree;
/// use flexclock::newick::NewickReader;
/// use flexclock::parser::byte_parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("((A:1,B:1):1,C:2);");
/// let mut reader = NewickReader::new().with_num_leaves(3);
/// let tree = reader.read_tree(&mut parser).unwrap();
/// assert_eq!(tree.height(tree.root()), 2.0);
/// ```
pub struct NewickReader {
    num_leaves: Option<usize>,
}

impl Default for NewickReader {
    fn default() -> Self {
        Self::new()
    }
}

impl NewickReader {
    /// Creates a new reader that counts leaves while reading.
    pub fn new() -> Self {
        Self { num_leaves: None }
    }

    /// Sets the expected number of leaves, for pre-allocation.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = Some(num_leaves);
        self
    }

    /// Reads a single tree terminated by `;`.
    pub fn read_tree(&mut self, parser: &mut ByteParser) -> Result<TimeTree, ParsingError> {
        let capacity = self.num_leaves.unwrap_or(DEFAULT_NUM_LEAVES_GUESS);
        let mut pending = PendingTree {
            tree: TimeTree::new(capacity),
            branch_lengths: Vec::with_capacity(2 * capacity),
        };

        parser.skip_comment_and_whitespace()?;
        let children = self.read_children(parser, &mut pending)?;

        // Root may have a branch length, which is ignored
        parser.skip_comment_and_whitespace()?;
        if parser.consume_if(b':') {
            parser.skip_comment_and_whitespace()?;
            parser.parse_number()?;
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", parser.peek().map(|b| b as char)),
            ));
        }

        pending.tree.add_root(children, Height::ZERO);
        pending.branch_lengths.push(0.0);
        let tree = pending.into_time_tree()?;

        // Now we know the number of leaves of trees to come
        self.num_leaves.get_or_insert(tree.num_leaves());
        Ok(tree)
    }

    /// Reads trees until EOF.
    pub fn read_all(&mut self, mut parser: ByteParser) -> Result<Vec<TimeTree>, ParsingError> {
        let mut trees = Vec::new();
        parser.skip_comment_and_whitespace()?;
        while !parser.is_eof() {
            trees.push(self.read_tree(&mut parser)?);
            parser.skip_comment_and_whitespace()?;
        }
        Ok(trees)
    }

    fn read_vertex(&mut self, parser: &mut ByteParser, pending: &mut PendingTree) -> Result<NodeId, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            let children = self.read_children(parser, pending)?;
            let branch_length = self.read_branch_length(parser)?;
            Ok(pending.add_internal(children, branch_length))
        } else {
            let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
            if label.is_empty() {
                return Err(ParsingError::invalid_newick_string(parser, "Empty leaf label".to_string()));
            }
            let branch_length = self.read_branch_length(parser)?;
            Ok(pending.add_leaf(&label, branch_length))
        }
    }

    /// Reads `(left,right)`, expecting the parser at `(`.
    fn read_children(&mut self, parser: &mut ByteParser, pending: &mut PendingTree) -> Result<[NodeId; 2], ParsingError> {
        if !parser.consume_if(b'(') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", parser.peek().map(|b| b as char)),
            ));
        }
        let left = self.read_vertex(parser, pending)?;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b',') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ',' between children but found {:?}", parser.peek().map(|b| b as char)),
            ));
        }
        let right = self.read_vertex(parser, pending)?;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b')') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ')' after children but found {:?} (only binary trees are supported)", parser.peek().map(|b| b as char)),
            ));
        }

        Ok([left, right])
    }

    /// Reads the mandatory `:number` after a non-root vertex.
    fn read_branch_length(&mut self, parser: &mut ByteParser) -> Result<f64, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Err(ParsingError::invalid_newick_string(parser, "Missing branch length".to_string()));
        }
        parser.skip_comment_and_whitespace()?;

        let length = parser.parse_number()?;
        if !(length >= 0.0 && length.is_finite()) {
            return Err(ParsingError::invalid_newick_string(parser, format!("Invalid branch length: {length}")));
        }
        Ok(length)
    }
}

/// Tree under construction, with branch lengths kept aside until heights are known.
struct PendingTree {
    tree: TimeTree,
    branch_lengths: Vec<f64>,
}

impl PendingTree {
    fn add_leaf(&mut self, label: &str, branch_length: f64) -> NodeId {
        self.branch_lengths.push(branch_length);
        self.tree.add_leaf(Height::ZERO, label)
    }

    fn add_internal(&mut self, children: [NodeId; 2], branch_length: f64) -> NodeId {
        self.branch_lengths.push(branch_length);
        self.tree.add_internal_vertex(children, Height::ZERO)
    }

    /// Converts depths below the root into heights above the deepest leaf.
    fn into_time_tree(self) -> Result<TimeTree, ParsingError> {
        let PendingTree { mut tree, branch_lengths } = self;

        let mut depths = vec![0.0; tree.node_count()];
        let order: Vec<NodeId> = tree.pre_order_iter().collect();
        for &node in &order {
            if let Some(parent) = tree.parent(node) {
                depths[node] = depths[parent] + branch_lengths[node];
            }
        }

        let max_depth = depths.iter().copied().fold(0.0, f64::max);
        for &node in &order {
            let height = (max_depth - depths[node]).max(0.0);
            tree[node].set_height(Height::new(height));
        }

        tree.settle_num_leaves();
        if tree.labels().num_labels() != tree.num_leaves() {
            return Err(ParsingError::without_context(ParsingErrorType::InvalidTreeStructure(
                "duplicate leaf labels".to_string(),
            )));
        }

        Ok(tree)
    }
}
