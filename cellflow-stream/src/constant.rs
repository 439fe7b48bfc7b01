// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeCore, NodeValue};
use std::sync::Arc;

/// Leaf node with a fixed current value that never emits on its own.
#[derive(Debug)]
pub struct Constant<V: NodeValue> {
    core: NodeCore<V>,
    value: V,
}

impl<V: NodeValue> Constant<V> {
    pub fn new(value: V) -> Arc<Self> {
        Arc::new(Self {
            core: NodeCore::new(),
            value,
        })
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<V: NodeValue> Node for Constant<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        &self.core
    }

    fn current_value(&self) -> Option<V> {
        Some(self.value.clone())
    }
}
