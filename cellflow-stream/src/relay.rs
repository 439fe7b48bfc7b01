// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeCore, NodeValue};
use std::sync::Arc;

/// Leaf node that forwards values without remembering any.
///
/// A relay never has a current value, so [`tap`](cellflow_core::NodeExt::tap) behaves
/// like `subscribe`. Values are pushed with [`NodeExt::send`](cellflow_core::NodeExt::send).
#[derive(Debug)]
pub struct Relay<V: NodeValue> {
    core: NodeCore<V>,
}

impl<V: NodeValue> Relay<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            core: NodeCore::new(),
        })
    }
}

impl<V: NodeValue> Node for Relay<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        &self.core
    }

    fn current_value(&self) -> Option<V> {
        None
    }
}
