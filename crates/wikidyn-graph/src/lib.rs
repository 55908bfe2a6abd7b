mod builders;
mod graph;

pub use builders::{
    category_network, editor_trajectory, hyperlink_network, invert_contributions,
    page_trajectory, shared_editing_network, shared_page_editing_network,
};
pub use graph::{Cleanup, EdgeAccumulator, ExportEdge, GraphExport, GraphNode, NodeKind, WikiGraph};
