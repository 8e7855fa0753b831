//! Utility functions and helpers
//!
//! Display formatting follows pt-BR conventions: `R$ 1.234,56`,
//! `15/03/2025` and `Mar 2025` for competências.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Separators and symbol used to render money
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    pub symbol: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "R$".to_string(),
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
        }
    }
}

/// Group the digits of a non-negative integer string with a separator
pub fn format_number(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a monetary value with two decimal places
pub fn format_money(value: Decimal, format: &MoneyFormat) -> String {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!(
        "{}{} {}{}{}",
        sign,
        format.symbol,
        format_number(int_part, &format.thousands_separator),
        format.decimal_separator,
        frac_part
    )
}

/// Format a date as dd/mm/yyyy
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format an ISO date string, falling back to the raw text when unparsable
pub fn format_date_str(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => format_date(&d),
        Err(_) => date.to_string(),
    }
}

/// Three-letter pt-BR abbreviation for an upper-case month name
pub fn month_abbreviation(month: &str) -> Option<&'static str> {
    let abbrev = match month.trim().to_uppercase().as_str() {
        "JANEIRO" => "Jan",
        "FEVEREIRO" => "Fev",
        "MARCO" | "MARÇO" => "Mar",
        "ABRIL" => "Abr",
        "MAIO" => "Mai",
        "JUNHO" => "Jun",
        "JULHO" => "Jul",
        "AGOSTO" => "Ago",
        "SETEMBRO" => "Set",
        "OUTUBRO" => "Out",
        "NOVEMBRO" => "Nov",
        "DEZEMBRO" => "Dez",
        _ => return None,
    };
    Some(abbrev)
}

/// Format a competência such as `MARCO/2025` as `Mar 2025`
///
/// Unknown month names are kept verbatim.
pub fn format_competencia(competencia: &str) -> String {
    match competencia.split_once('/') {
        Some((mes, ano)) => {
            let label = month_abbreviation(mes).unwrap_or(mes);
            format!("{} {}", label, ano)
        }
        None => competencia.to_string(),
    }
}

/// Escape text for safe inclusion in HTML bodies and quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("0", "."), "0");
        assert_eq!(format_number("999", "."), "999");
        assert_eq!(format_number("1000", "."), "1.000");
        assert_eq!(format_number("1234567", ","), "1,234,567");
    }

    #[test]
    fn test_format_money_reais() {
        let reais = MoneyFormat::default();
        assert_eq!(format_money(Decimal::from_str("1234.5").unwrap(), &reais), "R$ 1.234,50");
        assert_eq!(format_money(Decimal::from_str("0").unwrap(), &reais), "R$ 0,00");
        assert_eq!(format_money(Decimal::from_str("-42.129").unwrap(), &reais), "-R$ 42,13");
        assert_eq!(format_money(Decimal::from_str("1000000").unwrap(), &reais), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_money_custom_separators() {
        let format = MoneyFormat {
            symbol: "US$".to_string(),
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
        };
        assert_eq!(format_money(Decimal::from_str("9876.5").unwrap(), &format), "US$ 9,876.50");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date_str("2025-03-15"), "15/03/2025");
        assert_eq!(format_date_str("ontem"), "ontem");
    }

    #[test]
    fn test_format_competencia() {
        assert_eq!(format_competencia("MARCO/2025"), "Mar 2025");
        assert_eq!(format_competencia("MARÇO/2025"), "Mar 2025");
        assert_eq!(format_competencia("DEZEMBRO/2024"), "Dez 2024");
        assert_eq!(format_competencia("TRIMESTRE/2024"), "TRIMESTRE 2024");
        assert_eq!(format_competencia("sem-barra"), "sem-barra");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Pão" & 'café'</b>"#),
            "&lt;b&gt;&quot;Pão&quot; &amp; &#39;café&#39;&lt;/b&gt;"
        );
    }
}
