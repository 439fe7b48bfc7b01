// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Cached current value of an operator node.
///
/// An operator only reports a current value when its upstream does. That gives
/// three states instead of two:
///
/// - [`Untracked`](CurrentValue::Untracked): upstream has no current value, so
///   neither does this node, whatever it emits;
/// - [`Pending`](CurrentValue::Pending): a current value is kept but none has been
///   produced yet;
/// - [`Held`](CurrentValue::Held): the value last delivered downstream.
///
/// # Example
///
/// ```
/// use cellflow_core::CurrentValue;
///
/// let mut untracked = CurrentValue::from_upstream(false);
/// untracked.update(&1);
/// assert_eq!(untracked.get(), None);
///
/// let mut tracked = CurrentValue::from_upstream(true);
/// assert_eq!(tracked.get(), None);
/// tracked.update(&1);
/// assert_eq!(tracked.get(), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentValue<V> {
    #[default]
    Untracked,
    Pending,
    Held(V),
}

impl<V: Clone> CurrentValue<V> {
    /// `Pending` if the upstream reports a current value, `Untracked` otherwise.
    pub fn from_upstream(upstream_has_value: bool) -> Self {
        if upstream_has_value {
            Self::Pending
        } else {
            Self::Untracked
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Untracked)
    }

    pub fn get(&self) -> Option<V> {
        match self {
            Self::Held(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Record `value` as the current value if this cache is tracked.
    pub fn update(&mut self, value: &V) {
        if self.is_tracked() {
            *self = Self::Held(value.clone());
        }
    }

    /// Start tracking. A cache that is already tracked keeps its value.
    pub fn track(&mut self) {
        if !self.is_tracked() {
            *self = Self::Pending;
        }
    }
}
