//! Financial Ledger
//!
//! Loans, straight-line depreciation, tax accrual and net worth. Shortfalls
//! degrade the payment instead of failing: a loan the group cannot cover is
//! short-paid and the unpaid principal stays on the balance.

use tracing::{info, warn};
use venue_state::{generate_asset_id, generate_loan_id, FixedAsset, Loan, WeekEvent, WorldState};

use crate::catalog::loan_product;
use crate::error::ActionError;
use crate::numeric::clamp;

/// Constants for lending and depreciation
pub mod ledger_constants {
    pub const MIN_PRINCIPAL: f64 = 1_000.0;
    pub const MIN_TERM_WEEKS: u32 = 12;
    pub const MAX_APR: f64 = 0.40;
    pub const MIN_ASSET_LIFE_WEEKS: u32 = 26;
    /// Balances below this count as settled
    pub const SETTLED: f64 = 0.005;
    /// Fit-out life when a venue is acquired
    pub const FITOUT_LIFE_WEEKS: u32 = 260;
    /// Goodwill life when a venue is acquired
    pub const GOODWILL_LIFE_WEEKS: u32 = 520;
}

use ledger_constants::*;

/// Weekly annuity payment; straight-line when the rate is zero.
pub fn weekly_payment(principal: f64, apr: f64, term_weeks: u32) -> f64 {
    let n = term_weeks.max(1) as f64;
    let r = apr / 52.0;
    if r.abs() < 1e-12 {
        principal / n
    } else {
        principal * r / (1.0 - (1.0 + r).powf(-n))
    }
}

/// Funds an amortizing loan and returns its id.
pub fn take_loan(
    world: &mut WorldState,
    amount: f64,
    apr: f64,
    term_weeks: u32,
    lender: &str,
) -> String {
    let principal = amount.max(MIN_PRINCIPAL);
    let term = term_weeks.max(MIN_TERM_WEEKS);
    let apr = clamp(apr, 0.0, MAX_APR);
    let id = generate_loan_id(world.next_sequence());

    world.loans.push(Loan {
        id: id.clone(),
        lender: lender.chars().take(30).collect(),
        principal,
        balance: principal,
        apr,
        weekly_payment: weekly_payment(principal, apr, term),
        weeks_left: term,
        taken_week: world.week,
    });
    world.cash += principal;
    info!(loan = %id, principal, apr, term, "Loan funded");
    id
}

/// Takes one of the catalog loan products, clamping the amount to its range.
pub fn take_product_loan(
    world: &mut WorldState,
    product_id: &str,
    amount: f64,
) -> Result<String, ActionError> {
    let product = loan_product(product_id)
        .ok_or_else(|| ActionError::UnknownLoanProduct(product_id.to_string()))?;
    let amount = clamp(amount, product.min, product.max);
    Ok(take_loan(world, amount, product.apr, product.term_weeks, product.label))
}

/// Totals from one week of loan service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanTick {
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub events: Vec<WeekEvent>,
}

/// Services every loan from cash. The final scheduled payment (or any
/// payment after the term) settles the residual balance.
pub fn tick_loans(world: &mut WorldState) -> LoanTick {
    let mut tick = LoanTick::default();

    for loan in world.loans.iter_mut() {
        if loan.balance <= SETTLED {
            continue;
        }
        let interest = loan.balance * loan.apr / 52.0;
        let due = if loan.weeks_left <= 1 {
            loan.balance + interest
        } else {
            loan.weekly_payment.min(loan.balance + interest)
        };
        let payment = due.min(world.cash.max(0.0));
        if payment + SETTLED < due {
            warn!(loan = %loan.id, due, paid = payment, "Loan short-paid");
            tick.events.push(WeekEvent::LoanShortPaid {
                loan_id: loan.id.clone(),
                due,
                paid: payment,
            });
        }

        // Unpaid interest capitalizes onto the balance.
        let principal_paid = payment - interest;
        loan.balance = (loan.balance - principal_paid).max(0.0);
        loan.weeks_left = loan.weeks_left.saturating_sub(1);
        world.cash -= payment;

        tick.payment += payment;
        tick.interest += interest;
        tick.principal += principal_paid.max(0.0);
    }

    world.loans.retain(|loan| {
        let settled = loan.balance <= SETTLED;
        if settled {
            info!(loan = %loan.id, "Loan repaid");
            tick.events.push(WeekEvent::LoanRepaid {
                loan_id: loan.id.clone(),
            });
        }
        !settled
    });
    tick
}

/// Capitalizes an asset for straight-line depreciation. Returns its id.
pub fn add_fixed_asset(world: &mut WorldState, label: &str, cost: f64, life_weeks: u32) -> String {
    let life = life_weeks.max(MIN_ASSET_LIFE_WEEKS);
    let cost = cost.max(0.0);
    let id = generate_asset_id(world.next_sequence());
    world.fixed_assets.push(FixedAsset {
        id: id.clone(),
        label: label.to_string(),
        cost,
        book: cost,
        dep_weekly: cost / life as f64,
        life_weeks: life,
        acquired_week: world.week,
    });
    info!(asset = %id, label, cost, life, "Asset capitalized");
    id
}

/// One week of depreciation. Fully depreciated assets are removed.
pub fn tick_depreciation(world: &mut WorldState) -> (f64, Vec<WeekEvent>) {
    let mut total = 0.0;
    for asset in world.fixed_assets.iter_mut() {
        let dep = asset.dep_weekly.min(asset.book).max(0.0);
        asset.book -= dep;
        total += dep;
    }

    let mut events = Vec::new();
    world.fixed_assets.retain(|a| {
        let keep = a.book > 0.01;
        if !keep {
            events.push(WeekEvent::AssetRetired {
                asset_id: a.id.clone(),
            });
        }
        keep
    });
    (total, events)
}

/// Accrues tax on positive profit only. Returns the tax expense.
pub fn accrue_tax(world: &mut WorldState, profit_before_tax: f64) -> f64 {
    if profit_before_tax <= 0.0 {
        return 0.0;
    }
    let tax = profit_before_tax * world.tax_rate.max(0.0);
    world.tax_accrued += tax;
    tax
}

/// Pays the lesser of `amount`, the accrued liability and cash.
pub fn pay_tax(world: &mut WorldState, amount: f64) -> f64 {
    let pay = amount.min(world.tax_accrued).min(world.cash).max(0.0);
    world.tax_accrued = (world.tax_accrued - pay).max(0.0);
    world.cash -= pay;
    info!(paid = pay, remaining = world.tax_accrued, "Tax paid");
    pay
}

pub fn debt_outstanding(world: &WorldState) -> f64 {
    world.loans.iter().map(|l| l.balance).sum()
}

pub fn assets_book(world: &WorldState) -> f64 {
    world.fixed_assets.iter().map(|a| a.book).sum()
}

/// `cash + Σ asset book − Σ loan balance`.
pub fn net_worth(world: &WorldState) -> f64 {
    world.cash + assets_book(world) - debt_outstanding(world)
}
