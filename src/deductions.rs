//! Deduction capping rules.
//!
//! Each statutory deduction is bounded by a percentage of gross income.
//! Rules implement the [`DeductionRule`] trait and are looked up by label
//! in a [`DeductionRegistry`] owned by the calculation service.  New rules
//! can be registered without touching the service.

use crate::models::Deduction;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Caps a claimed deduction.
///
/// Rules must be thread-safe (`Send + Sync`) because the registry is
/// shared across request handlers and batch workers.
pub trait DeductionRule: Send + Sync {
    /// Returns the allowed amount for `claimed` given the taxpayer's
    /// `gross` income.  The result never exceeds `claimed`.
    fn cap(&self, claimed: f64, gross: f64) -> f64;
}

/// Allows at most `fraction` of gross income.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageCap {
    pub fraction: f64,
}

impl PercentageCap {
    pub const fn new(fraction: f64) -> Self {
        Self { fraction }
    }
}

impl DeductionRule for PercentageCap {
    fn cap(&self, claimed: f64, gross: f64) -> f64 {
        claimed.min(self.fraction * gross)
    }
}

/// Allows the full claimed amount.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Uncapped;

impl DeductionRule for Uncapped {
    fn cap(&self, claimed: f64, _gross: f64) -> f64 {
        claimed
    }
}

impl<F> DeductionRule for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn cap(&self, claimed: f64, gross: f64) -> f64 {
        self(claimed, gross)
    }
}

pub const PENSION: &str = "Pension";
pub const NHF: &str = "NHF";
pub const NHIS: &str = "NHIS";

/// Label → rule mapping consulted on every calculation.
///
/// Lookups take a read lock; [`register`](Self::register) takes the write
/// lock, so rules may be added while requests are being served.
#[derive(Default)]
pub struct DeductionRegistry {
    rules: RwLock<HashMap<String, Arc<dyn DeductionRule>>>,
}

impl DeductionRegistry {
    /// An empty registry.  Every deduction resolves to nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the statutory rules: pension (8%), National Housing
    /// Fund (2.5%) and National Health Insurance Scheme (5%).
    pub fn statutory() -> Self {
        Self::new()
            .with_rule(PENSION, PercentageCap::new(0.08))
            .with_rule(NHF, PercentageCap::new(0.025))
            .with_rule(NHIS, PercentageCap::new(0.05))
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_rule(self, kind: impl Into<String>, rule: impl DeductionRule + 'static) -> Self {
        self.register(kind, rule);
        self
    }

    /// Adds or replaces the rule for `kind`.
    pub fn register(&self, kind: impl Into<String>, rule: impl DeductionRule + 'static) {
        // A panic while holding the lock cannot leave the map half-written,
        // so poisoned guards are taken as-is.
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind.into(), Arc::new(rule));
    }

    /// Looks up the rule for `kind` (case-sensitive).
    pub fn resolve(&self, kind: &str) -> Option<Arc<dyn DeductionRule>> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .cloned()
    }

    /// Allowed amount for a single deduction, never more than was
    /// claimed.  Unregistered kinds contribute zero; callers may pass
    /// informational rows.
    pub fn allowed(&self, deduction: &Deduction, gross: f64) -> f64 {
        match self.resolve(&deduction.kind) {
            Some(rule) => rule.cap(deduction.amount, gross).min(deduction.amount),
            None => 0.0,
        }
    }

    /// Registered labels in sorted order.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for DeductionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeductionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
