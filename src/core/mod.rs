pub mod caption;
pub mod engine;
pub mod queue;
pub mod scan;
pub mod trie;
pub mod types;
