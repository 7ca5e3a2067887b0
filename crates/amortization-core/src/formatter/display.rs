//! HTML rendering of a repayment schedule for contract documents.
//!
//! The output is spliced verbatim into a larger HTML document, so every
//! piece of text that reaches the markup is escaped here.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::schedule::summarize;
use crate::types::{Money, ScheduleEntry};
use crate::AmortizationResult;

/// Token a contract template carries where the schedule table belongs.
pub const SCHEDULE_PLACEHOLDER: &str = "{{repayment_schedule}}";

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCaptions {
    pub payment_number: String,
    pub due_date: String,
    pub principal: String,
    pub interest: String,
    pub fee: String,
    pub total: String,
    pub balance: String,
    pub totals_row: String,
}

/// Currency and date presentation rules of the contract's audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLocale {
    pub currency_symbol: String,
    pub symbol_position: SymbolPosition,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: u32,
    pub date_format: String,
    pub captions: ColumnCaptions,
}

impl DisplayLocale {
    pub fn en_us() -> Self {
        Self {
            currency_symbol: "$".into(),
            symbol_position: SymbolPosition::Prefix,
            thousands_separator: ",".into(),
            decimal_separator: ".".into(),
            decimal_places: 2,
            date_format: "%m/%d/%Y".into(),
            captions: ColumnCaptions {
                payment_number: "#".into(),
                due_date: "Due date".into(),
                principal: "Principal".into(),
                interest: "Interest".into(),
                fee: "Management fee".into(),
                total: "Installment".into(),
                balance: "Remaining balance".into(),
                totals_row: "Total".into(),
            },
        }
    }

    /// West African CFA franc, French captions. The franc has no minor unit.
    pub fn fr_xof() -> Self {
        Self {
            currency_symbol: "FCFA".into(),
            symbol_position: SymbolPosition::Suffix,
            thousands_separator: "\u{a0}".into(),
            decimal_separator: ",".into(),
            decimal_places: 0,
            date_format: "%d/%m/%Y".into(),
            captions: ColumnCaptions {
                payment_number: "N°".into(),
                due_date: "Échéance".into(),
                principal: "Capital".into(),
                interest: "Intérêts".into(),
                fee: "Frais de gestion".into(),
                total: "Mensualité".into(),
                balance: "Capital restant dû".into(),
                totals_row: "Total".into(),
            },
        }
    }

    /// Look up a preset by tag (`en-US`, `fr-XOF`; case-insensitive).
    pub fn from_tag(tag: &str) -> AmortizationResult<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" => Ok(Self::en_us()),
            "fr-xof" | "fr" => Ok(Self::fr_xof()),
            other => Err(AmortizationError::InvalidInput {
                field: "locale".into(),
                reason: format!("Unsupported locale '{other}' (expected en-US or fr-XOF)"),
            }),
        }
    }

    pub fn format_money(&self, amount: Money) -> String {
        let mut rounded =
            amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.decimal_places);

        let digits = rounded.abs().to_string();
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };

        let mut number = group_thousands(int_part, &self.thousands_separator);
        if let Some(frac) = frac_part {
            number.push_str(&self.decimal_separator);
            number.push_str(frac);
        }
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        // The sign leads the whole amount, symbol included: -$1,500.50
        match self.symbol_position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.currency_symbol, number),
            SymbolPosition::Suffix => format!("{}{} {}", sign, number, self.currency_symbol),
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        let valid = !StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        let pattern = if valid {
            self.date_format.as_str()
        } else {
            FALLBACK_DATE_FORMAT
        };
        date.format(pattern).to_string()
    }
}

impl Default for DisplayLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

fn group_thousands(int_part: &str, separator: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the schedule as an HTML table ready to splice into a contract.
///
/// Columns: payment number, due date, principal, interest, fee, installment,
/// remaining balance. A totals footer is added when the schedule is not empty.
pub fn to_display_table(schedule: &[ScheduleEntry], locale: &DisplayLocale) -> String {
    let c = &locale.captions;
    let money = |amount: Money| escape_html(&locale.format_money(amount));

    let mut html = String::from("<table class=\"repayment-schedule\">\n<thead>\n<tr>");
    for caption in [
        &c.payment_number,
        &c.due_date,
        &c.principal,
        &c.interest,
        &c.fee,
        &c.total,
        &c.balance,
    ] {
        let _ = write!(html, "<th>{}</th>", escape_html(caption));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for entry in schedule {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td class=\"amount\">{}</td><td class=\"amount\">{}</td>\
             <td class=\"amount\">{}</td><td class=\"amount\">{}</td><td class=\"amount\">{}</td></tr>",
            entry.payment_number,
            escape_html(&locale.format_date(entry.due_date)),
            money(entry.principal_portion),
            money(entry.interest_portion),
            money(entry.management_fee_portion),
            money(entry.total_payment),
            money(entry.remaining_balance),
        );
    }
    html.push_str("</tbody>\n");

    if !schedule.is_empty() {
        let totals = summarize(schedule);
        let _ = writeln!(
            html,
            "<tfoot>\n<tr><th colspan=\"2\">{}</th><td class=\"amount\">{}</td><td class=\"amount\">{}</td>\
             <td class=\"amount\">{}</td><td class=\"amount\">{}</td><td></td></tr>\n</tfoot>",
            escape_html(&c.totals_row),
            money(totals.total_principal),
            money(totals.total_interest),
            money(totals.total_fees),
            money(totals.total_repayment),
        );
    }

    html.push_str("</table>");
    html
}

/// Replace every [`SCHEDULE_PLACEHOLDER`] in a contract template with the
/// rendered schedule table.
pub fn embed_schedule_table(
    template: &str,
    schedule: &[ScheduleEntry],
    locale: &DisplayLocale,
) -> String {
    if !template.contains(SCHEDULE_PLACEHOLDER) {
        return template.to_string();
    }
    template.replace(SCHEDULE_PLACEHOLDER, &to_display_table(schedule, locale))
}
