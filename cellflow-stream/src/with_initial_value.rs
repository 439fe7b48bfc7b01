// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{
    subscribe_weak, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeValue, Subscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Gives a node without a current value a starting one.
///
/// The upstream's own current value is ignored; only later emissions replace the
/// initial value.
pub struct WithInitialValue<V: NodeValue> {
    outlet: CachingCore<V>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> WithInitialValue<V> {
    pub(crate) fn attach<N>(source: &Arc<N>, initial: V) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Held(initial)),
            upstream: Mutex::new(None),
        });

        let subscription = subscribe_weak(source, &node, |node, value| async move {
            node.outlet.emit(value).await;
        });
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<V: NodeValue> Node for WithInitialValue<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

pub trait WithInitialValueExt: NodeExt {
    fn with_initial_value(&self, initial: Self::Value) -> Arc<WithInitialValue<Self::Value>>;
}

impl<N: Node> WithInitialValueExt for Arc<N> {
    fn with_initial_value(&self, initial: N::Value) -> Arc<WithInitialValue<N::Value>> {
        WithInitialValue::attach(self, initial)
    }
}
