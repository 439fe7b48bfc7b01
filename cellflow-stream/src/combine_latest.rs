// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Joins the latest values of several nodes.
//!
//! [`CombineLatest`] keeps one slot per upstream node. Every upstream emission fills
//! its slot and, once every slot holds a value, emits the whole row. Filling a slot
//! and emitting the row happen as one step under the node's delivery lock, so two
//! upstreams emitting at the same time can never produce a row that misses one of
//! their values.
//!
//! # Example
//!
//! ```
//! use cellflow_core::{Node, NodeExt};
//! use cellflow_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let width = Subject::new(2);
//! let height = Subject::new(3);
//! let size = width.combine_latest(&height).await;
//!
//! assert_eq!(size.current_value(), Some((2, 3)));
//!
//! height.set(4).await;
//! assert_eq!(size.current_value(), Some((2, 4)));
//! # }
//! ```

use crate::any::AnyNode;
use crate::compact_map::CompactMap;
use crate::map::MapExt;
use crate::transform::Transform;
use async_trait::async_trait;
use cellflow_core::{tap_weak, CurrentValue, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

/// N-ary join over upstream nodes of one value type, emitting `Vec<V>` rows.
pub struct CombineLatest<V: NodeValue> {
    core: NodeCore<Vec<V>>,
    slots: Mutex<Vec<Option<V>>>,
    upstream: Mutex<Vec<Subscription<V>>>,
}

impl<V: NodeValue> CombineLatest<V> {
    /// Join `sources`, in order.
    pub async fn new<N>(sources: &[Arc<N>]) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Self::with_slots(sources.len());
        for (index, source) in sources.iter().enumerate() {
            node.attach(index, source).await;
        }
        node
    }

    fn with_slots(count: usize) -> Arc<Self> {
        Arc::new(Self {
            core: NodeCore::new(),
            slots: Mutex::new(vec![None; count]),
            upstream: Mutex::new(Vec::with_capacity(count)),
        })
    }

    async fn attach<N>(self: &Arc<Self>, index: usize, source: &Arc<N>)
    where
        N: Node<Value = V>,
    {
        let subscription = tap_weak(source, self, move |node, value| async move {
            node.fill(index, value).await;
        })
        .await;
        self.upstream.lock().push(subscription);
    }

    async fn fill(&self, index: usize, value: V) {
        let guard = self.core.lock().await;
        let row = {
            let mut slots = self.slots.lock();
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(value);
            }
            Self::complete_row(&slots)
        };
        if let Some(row) = row {
            self.core.deliver(&guard, row).await;
        }
    }

    fn complete_row(slots: &[Option<V>]) -> Option<Vec<V>> {
        slots.iter().cloned().collect()
    }

    /// Number of joined upstream nodes.
    pub fn arity(&self) -> usize {
        self.slots.lock().len()
    }
}

impl<V: NodeValue> Node for CombineLatest<V> {
    type Value = Vec<V>;

    fn core(&self) -> &NodeCore<Vec<V>> {
        &self.core
    }

    fn current_value(&self) -> Option<Vec<V>> {
        Self::complete_row(&self.slots.lock())
    }
}

#[derive(Clone)]
enum Slot<A, B, C> {
    First(A),
    Second(B),
    Third(C),
}

/// Join two nodes of different value types into pairs.
pub async fn combine_latest2<A, B>(a: &Arc<A>, b: &Arc<B>) -> Arc<AnyNode<(A::Value, B::Value)>>
where
    A: Node,
    B: Node,
{
    let join = CombineLatest::<Slot<A::Value, B::Value, ()>>::with_slots(2);
    join.attach(0, &a.map(Slot::<_, B::Value, ()>::First).await)
        .await;
    join.attach(1, &b.map(Slot::<A::Value, _, ()>::Second).await)
        .await;

    project(&join, |row| match row {
        [Slot::First(a), Slot::Second(b)] => Some((a.clone(), b.clone())),
        _ => None,
    })
    .await
}

/// Join three nodes of different value types into triples.
pub async fn combine_latest3<A, B, C>(
    a: &Arc<A>,
    b: &Arc<B>,
    c: &Arc<C>,
) -> Arc<AnyNode<(A::Value, B::Value, C::Value)>>
where
    A: Node,
    B: Node,
    C: Node,
{
    let join = CombineLatest::<Slot<A::Value, B::Value, C::Value>>::with_slots(3);
    join.attach(0, &a.map(Slot::<_, B::Value, C::Value>::First).await)
        .await;
    join.attach(1, &b.map(Slot::<A::Value, _, C::Value>::Second).await)
        .await;
    join.attach(2, &c.map(Slot::<A::Value, B::Value, _>::Third).await)
        .await;

    project(&join, |row| match row {
        [Slot::First(a), Slot::Second(b), Slot::Third(c)] => {
            Some((a.clone(), b.clone(), c.clone()))
        }
        _ => None,
    })
    .await
}

// Rows become tuples. The tuple node holds a current value as soon as every slot
// is filled, even when some upstream had none at construction time.
async fn project<S, T, F>(join: &Arc<CombineLatest<S>>, to_tuple: F) -> Arc<AnyNode<T>>
where
    S: NodeValue,
    T: NodeValue,
    F: Fn(&[S]) -> Option<T> + Send + Sync + 'static,
{
    let transform = Transform::sync(move |row: Vec<S>| to_tuple(&row));
    let tuples = CompactMap::attach_with_cache(join, transform, CurrentValue::Pending).await;
    AnyNode::with_cache(&tuples, CurrentValue::Pending).await
}

#[async_trait]
pub trait CombineLatestExt: NodeExt {
    /// Pair the latest values of this node and `other`.
    async fn combine_latest<M>(&self, other: &Arc<M>) -> Arc<AnyNode<(Self::Value, M::Value)>>
    where
        M: Node;

    /// Join this node with further nodes of the same value type into rows.
    async fn combine_latest_with<M>(&self, others: &[Arc<M>]) -> Arc<CombineLatest<Self::Value>>
    where
        M: Node<Value = Self::Value>;
}

#[async_trait]
impl<N: Node> CombineLatestExt for Arc<N> {
    async fn combine_latest<M>(&self, other: &Arc<M>) -> Arc<AnyNode<(N::Value, M::Value)>>
    where
        M: Node,
    {
        combine_latest2(self, other).await
    }

    async fn combine_latest_with<M>(&self, others: &[Arc<M>]) -> Arc<CombineLatest<N::Value>>
    where
        M: Node<Value = N::Value>,
    {
        let node = CombineLatest::with_slots(others.len() + 1);
        node.attach(0, self).await;
        for (index, other) in others.iter().enumerate() {
            node.attach(index + 1, other).await;
        }
        node
    }
}
