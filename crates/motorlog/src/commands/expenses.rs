//! Expense and statistics handlers.

use tabled::Tabled;

use motorlog_core::{Expense, ExpenseInput, Garage, Pagination, Statistics};

use crate::cli::{ExpensesArgs, ExpensesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(e: &Expense) -> Self {
        Self {
            id: e.id.to_string(),
            vehicle: e.vehicle_id.to_string(),
            date: output::opt(e.spent_at),
            amount: match e.currency {
                Some(ref c) => format!("{:.2} {c}", e.amount),
                None => format!("{:.2}", e.amount),
            },
            note: output::opt(e.description.as_ref()),
        }
    }
}

fn page_footer(page: &Pagination) -> String {
    let mut line = format!(
        "Page {} of {} ({} expenses)",
        page.current_page, page.last_page, page.total
    );
    if page.has_more {
        line.push_str(&format!(" -- next: --page {}", page.current_page + 1));
    }
    line
}

fn stats_detail(s: &Statistics) -> String {
    let currency = s.currency.clone().unwrap_or_default();
    let mut fields = vec![("Total".to_string(), format!("{:.2} {currency}", s.total_spent))];
    fields.extend(
        s.by_category
            .iter()
            .map(|c| (c.name.clone(), format!("{:.2}", c.amount))),
    );
    fields.extend(
        s.by_month
            .iter()
            .map(|m| (m.month.clone(), format!("{:.2}", m.amount))),
    );
    let borrowed: Vec<(&str, String)> = fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.trim_end().to_string()))
        .collect();
    output::detail_block(&borrowed)
}

pub async fn handle(
    garage: &Garage,
    args: ExpensesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ExpensesCommand::List { page, vehicle } => {
            let resp = garage.get_expenses(page, vehicle.as_ref()).await?;
            let out = output::render_list(
                &global.output,
                &resp.data,
                |e| ExpenseRow::from(e),
                |e| e.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            let show_footer = !global.quiet && matches!(global.output, OutputFormat::Table);
            if let (Some(pagination), true) = (&resp.pagination, show_footer) {
                eprintln!("{}", page_footer(pagination));
            }
            Ok(())
        }

        ExpensesCommand::Add {
            vehicle,
            amount,
            expense_type,
            date,
            description,
        } => {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CliError::Validation {
                    field: "amount".into(),
                    reason: "must be a non-negative number".into(),
                });
            }
            let input = ExpenseInput {
                vehicle_id: vehicle,
                amount,
                expense_type_id: expense_type,
                spent_at: date,
                description,
            };
            if let Some(expense) = util::settle(garage.add_expense(&input).await, global)? {
                output::print_done(global, &format!("Expense {} recorded", expense.id));
            }
            Ok(())
        }

        ExpensesCommand::Stats { vehicle, period } => {
            let stats = garage.get_statistics(vehicle.as_ref(), period).await?;
            let out = output::render_single(&global.output, &stats, stats_detail, |s| {
                format!("{:.2}", s.total_spent)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_points_at_next_page() {
        let page = Pagination {
            current_page: 2,
            per_page: 20,
            total: 41,
            last_page: 3,
            has_more: true,
        };
        assert_eq!(page_footer(&page), "Page 2 of 3 (41 expenses) -- next: --page 3");
    }
}
