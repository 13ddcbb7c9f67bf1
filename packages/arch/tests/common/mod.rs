use tracing_subscriber::EnvFilter;
use wysiwyg_arch::{Arch, ArchConfig, NodeId, SerializeOptions};

/// Route tracing output through the test harness (`RUST_LOG=debug` to see it)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn load(markup: &str) -> Arch {
    init_tracing();
    Arch::from_markup(ArchConfig::default(), markup).unwrap()
}

pub fn markup(arch: &Arch) -> String {
    arch.to_markup(arch.root(), SerializeOptions::default()).unwrap()
}

/// First visible text node with exactly this value
pub fn find_text(arch: &Arch, value: &str) -> NodeId {
    arch.text_nodes(arch.root())
        .into_iter()
        .find(|id| arch.node(*id).unwrap().text() == Some(value))
        .unwrap_or_else(|| panic!("no text node {value:?}"))
}

/// Every attached node has its parent listing it at its index
pub fn assert_symmetric(arch: &Arch) {
    let mut stack = vec![arch.root()];
    while let Some(id) = stack.pop() {
        for (index, child) in arch.children(id).iter().enumerate() {
            assert_eq!(arch.parent(*child), Some(id));
            assert_eq!(arch.index(*child), Some(index));
            stack.push(*child);
        }
    }
}
