//! Derived totals over the expense, payment and attendance collections.
//!
//! These used to be recomputed ad hoc next to the views that displayed
//! them; keeping them as pure functions makes the arithmetic testable on
//! its own and guarantees every view agrees on the same numbers.

use chrono::{Datelike, NaiveDate};

use crate::{AttendanceRecord, AttendanceStatus, Employee, ExpenseReport, Payment};

/// Share of gross sales counted as profit before costs.
pub const PROFIT_MARGIN: f64 = 0.2;

/// Salaries are treated as covering a fixed 30-day month.
pub const SALARY_DAYS_PER_MONTH: f64 = 30.0;

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Month-level profit breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitSummary {
    pub total_sell: f64,
    pub gross_profit: f64,
    pub total_expenses: f64,
    pub total_salaries: f64,
    pub net_profit: f64,
}

/// Net profit for one month: the profit share of that month's sales, minus
/// that month's itemized expenses, minus the full salary bill.
pub fn monthly_net_profit(
    expenses: &[ExpenseReport],
    employees: &[Employee],
    year: i32,
    month: u32,
) -> ProfitSummary {
    let monthly: Vec<&ExpenseReport> = expenses
        .iter()
        .filter(|report| in_month(report.date, year, month))
        .collect();

    let total_sell: f64 = monthly.iter().map(|report| report.total_sell).sum();
    let gross_profit = total_sell * PROFIT_MARGIN;
    let total_expenses: f64 = monthly
        .iter()
        .flat_map(|report| report.items.iter())
        .map(|item| item.price)
        .sum();
    let total_salaries: f64 = employees.iter().map(|employee| employee.salary).sum();

    ProfitSummary {
        total_sell,
        gross_profit,
        total_expenses,
        total_salaries,
        net_profit: gross_profit - total_expenses - total_salaries,
    }
}

/// One employee's salary slip for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Payslip {
    pub employee: String,
    pub total_salary: f64,
    pub daily_salary: f64,
    pub absent_days: u32,
    pub absent_deduction: f64,
    /// Sum of salary advances taken during the month.
    pub advances: f64,
    pub net_salary: f64,
}

/// Build a payslip from the employee's own records for the given month.
pub fn build_payslip(
    employee: &Employee,
    payments: &[Payment],
    attendance: &[AttendanceRecord],
    year: i32,
    month: u32,
) -> Payslip {
    let daily_salary = employee.salary / SALARY_DAYS_PER_MONTH;

    let absent_days = attendance
        .iter()
        .filter(|record| {
            record.employee == employee.name
                && record.status == AttendanceStatus::Absent
                && in_month(record.date, year, month)
        })
        .count() as u32;

    let advances: f64 = payments
        .iter()
        .filter(|payment| payment.employee == employee.name && in_month(payment.date, year, month))
        .map(|payment| payment.amount)
        .sum();

    let absent_deduction = absent_days as f64 * daily_salary;

    Payslip {
        employee: employee.name.clone(),
        total_salary: employee.salary,
        daily_salary,
        absent_days,
        absent_deduction,
        advances,
        net_salary: employee.salary - advances - absent_deduction,
    }
}
