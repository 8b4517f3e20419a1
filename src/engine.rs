//! Tax calculation service.
//!
//! The `engine` module turns a [`TaxCalculationRequest`] into a
//! [`TaxCalculationResponse`].  It sums declared income, caps each
//! deduction through the [`DeductionRegistry`], applies the relief
//! allowance and runs the progressive bracket walk.  Independent
//! requests can be evaluated together with [`TaxService::calculate_batch`],
//! which uses the [`rayon`] crate to spread them across CPU cores.

use crate::deductions::DeductionRegistry;
use crate::models::{TaxBreakdown, TaxCalculationRequest, TaxCalculationResponse, SUCCESS_MESSAGE};
use crate::tax::TaxEngine;
use rayon::prelude::*;
use tracing::debug;

/// Orchestrates a calculation.  Holds no mutable state apart from the
/// registry, which synchronises its own updates.
#[derive(Debug)]
pub struct TaxService {
    engine: TaxEngine,
    registry: DeductionRegistry,
}

impl TaxService {
    /// Default schedule with the statutory deduction rules.
    pub fn new() -> Self {
        Self::with_parts(TaxEngine::new(), DeductionRegistry::statutory())
    }

    pub fn with_parts(engine: TaxEngine, registry: DeductionRegistry) -> Self {
        Self { engine, registry }
    }

    pub fn engine(&self) -> &TaxEngine {
        &self.engine
    }

    /// The deduction rules in use.  Rules registered here apply to every
    /// later calculation.
    pub fn registry(&self) -> &DeductionRegistry {
        &self.registry
    }

    /// Computes the breakdown for one taxpayer.
    ///
    /// Amounts are assumed finite and non-negative; see
    /// [`TaxCalculationRequest::validate`].
    pub fn calculate_tax(&self, request: &TaxCalculationRequest) -> TaxCalculationResponse {
        let gross: f64 = request.incomes.iter().map(|income| income.amount).sum();

        let statutory: f64 = request
            .deductions
            .iter()
            .map(|deduction| self.registry.allowed(deduction, gross))
            .sum();

        let relief = self.engine.calculate_cra(gross);
        let total_deductions = statutory + relief;
        let taxable = (gross - total_deductions).max(0.0);
        let annual = self.engine.calculate_progressive_tax(taxable);

        debug!(gross, statutory, relief, taxable, annual, "tax calculated");

        TaxCalculationResponse {
            breakdown: TaxBreakdown {
                total_gross_income: gross,
                total_deductions,
                consolidated_relief: relief,
                taxable_income: taxable,
                annual_tax: annual,
                monthly_tax: annual / 12.0,
            },
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Computes several independent requests in parallel.  Results are
    /// returned in input order.
    pub fn calculate_batch(&self, requests: &[TaxCalculationRequest]) -> Vec<TaxCalculationResponse> {
        requests
            .par_iter()
            .map(|request| self.calculate_tax(request))
            .collect()
    }
}

impl Default for TaxService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deductions::{PercentageCap, Uncapped};
    use crate::models::{Deduction, IncomeSource};
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-6;

    fn income(kind: &str, amount: f64) -> IncomeSource {
        IncomeSource { kind: kind.into(), amount }
    }

    fn deduction(kind: &str, amount: f64) -> Deduction {
        Deduction { kind: kind.into(), amount }
    }

    #[test]
    fn single_employment_income_no_deductions() {
        let service = TaxService::new();
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 2_000_000.0)],
            deductions: vec![],
        };
        let got = service.calculate_tax(&request);
        assert_eq!(got.message, SUCCESS_MESSAGE);
        let b = got.breakdown;
        assert_eq!(b.total_gross_income, 2_000_000.0);
        assert!((b.consolidated_relief - 600_000.0).abs() < EPS);
        assert!((b.total_deductions - 600_000.0).abs() < EPS);
        assert!((b.taxable_income - 1_400_000.0).abs() < EPS);
        assert!((b.annual_tax - 186_000.0).abs() < EPS);
        assert!((b.monthly_tax - 15_500.0).abs() < EPS);
    }

    #[test]
    fn dynamically_registered_deduction_is_applied() {
        let service = TaxService::new();
        service.registry().register("LifeInsurance", Uncapped);
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 5_000_000.0)],
            deductions: vec![deduction("Pension", 400_000.0), deduction("LifeInsurance", 100_000.0)],
        };
        let b = service.calculate_tax(&request).breakdown;
        assert!((b.consolidated_relief - 1_200_000.0).abs() < EPS);
        assert!((b.total_deductions - 1_700_000.0).abs() < EPS);
        assert!((b.taxable_income - 3_300_000.0).abs() < EPS);
        assert!((b.annual_tax - 584_000.0).abs() < EPS);
        assert!((b.monthly_tax - 584_000.0 / 12.0).abs() < EPS);
    }

    #[test]
    fn registration_does_not_leak_between_services() {
        let first = TaxService::new();
        first.registry().register("LifeInsurance", Uncapped);
        let second = TaxService::new();
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 5_000_000.0)],
            deductions: vec![deduction("LifeInsurance", 100_000.0)],
        };
        let with = first.calculate_tax(&request).breakdown;
        let without = second.calculate_tax(&request).breakdown;
        assert!((with.total_deductions - without.total_deductions - 100_000.0).abs() < EPS);
    }

    #[test]
    fn unknown_deduction_contributes_nothing() {
        let service = TaxService::new();
        let base = TaxCalculationRequest {
            incomes: vec![income("Employment", 3_000_000.0)],
            deductions: vec![],
        };
        let mut with_unknown = base.clone();
        with_unknown.deductions.push(deduction("Rent", 1_000_000_000.0));
        assert_eq!(service.calculate_tax(&base), service.calculate_tax(&with_unknown));
    }

    #[test]
    fn incomes_of_any_type_are_summed() {
        let service = TaxService::new();
        let request = TaxCalculationRequest {
            incomes: vec![
                income("Employment", 1_500_000.0),
                income("Freelance", 400_000.0),
                income("Rental", 100_000.0),
            ],
            deductions: vec![],
        };
        let b = service.calculate_tax(&request).breakdown;
        assert_eq!(b.total_gross_income, 2_000_000.0);
        assert!((b.annual_tax - 186_000.0).abs() < EPS);
    }

    #[test]
    fn taxable_income_is_floored_at_zero() {
        let service = TaxService::new();
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 150_000.0)],
            deductions: vec![deduction("Pension", 12_000.0)],
        };
        let b = service.calculate_tax(&request).breakdown;
        assert_eq!(b.taxable_income, 0.0);
        assert_eq!(b.annual_tax, 0.0);
        assert_eq!(b.monthly_tax, 0.0);
        assert!((b.consolidated_relief - 230_000.0).abs() < EPS);
        assert!((b.total_deductions - 242_000.0).abs() < EPS);
    }

    #[test]
    fn empty_request_yields_zero_tax() {
        let b = TaxService::new()
            .calculate_tax(&TaxCalculationRequest::default())
            .breakdown;
        assert_eq!(b.total_gross_income, 0.0);
        assert_eq!(b.consolidated_relief, 200_000.0);
        assert_eq!(b.taxable_income, 0.0);
        assert_eq!(b.annual_tax, 0.0);
    }

    #[test]
    fn custom_registry_replaces_statutory_rules() {
        let registry = DeductionRegistry::new().with_rule("Pension", PercentageCap::new(0.5));
        let service = TaxService::with_parts(TaxEngine::new(), registry);
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 1_000_000.0)],
            deductions: vec![deduction("Pension", 300_000.0), deduction("NHF", 25_000.0)],
        };
        let b = service.calculate_tax(&request).breakdown;
        assert!((b.total_deductions - 700_000.0).abs() < EPS);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let service = TaxService::new();
        let request = TaxCalculationRequest {
            incomes: vec![income("Employment", 7_250_000.5)],
            deductions: vec![deduction("NHIS", 100_000.0), deduction("NHF", 999_999.0)],
        };
        let first = serde_json::to_vec(&service.calculate_tax(&request)).unwrap();
        let second = serde_json::to_vec(&service.calculate_tax(&request)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn batch_preserves_order_and_matches_single_calls() {
        let service = TaxService::new();
        let requests: Vec<TaxCalculationRequest> = (1..=50)
            .map(|i| TaxCalculationRequest {
                incomes: vec![income("Employment", f64::from(i) * 250_000.0)],
                deductions: vec![deduction("Pension", f64::from(i) * 10_000.0)],
            })
            .collect();
        let batch = service.calculate_batch(&requests);
        let sequential: Vec<_> = requests.iter().map(|r| service.calculate_tax(r)).collect();
        assert_eq!(batch, sequential);
    }
}
