mod component;
mod render;
pub mod state;
pub mod storage;

pub use component::GraphView;
pub use state::{GraphViewState, NodeDetails, Overlay, Tooltip};
pub use storage::LocalStorageStore;
