// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod session;

pub use crate::core::engine::Dataset;
pub use crate::core::queue::{FixedDecision, OnboardingDecision, OnboardingPrompt};
pub use crate::core::trie::PrefixTrie;
pub use crate::core::types::{TagAction, Target};
pub use crate::error::{DatasetError, Result};
