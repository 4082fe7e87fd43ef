//! Terminal rendering for vendordesk records

use chrono::NaiveDate;
use vendordesk_client::types::{DashboardStats, ReminderType, Service, ServiceReminder, Vendor};

/// `Jan 5, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `$1,234.50`, negatives as `-$12.00`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn days_label(days: i64, noun: &str) -> String {
    match days {
        d if d < 0 => format!("{noun} {} days ago", -d),
        0 => format!("{noun} today"),
        1 => format!("{noun} tomorrow"),
        d => format!("{noun} in {d} days"),
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_row = |cells: &mut dyn Iterator<Item = &str>| -> String {
        cells
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = render_row(&mut headers.iter().copied());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render_row(&mut rule.iter().map(String::as_str)));
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(&mut row.iter().map(String::as_str)));
    }
    out
}

pub fn vendors_table(vendors: &[Vendor]) -> String {
    if vendors.is_empty() {
        return "No vendors found.".to_string();
    }
    let rows: Vec<Vec<String>> = vendors
        .iter()
        .map(|v| {
            vec![
                v.id.to_string(),
                v.name.clone(),
                v.contact_person.clone(),
                v.email.clone(),
                v.phone.clone(),
                v.status.to_string(),
            ]
        })
        .collect();
    table(&["ID", "NAME", "CONTACT", "EMAIL", "PHONE", "STATUS"], &rows)
}

pub fn vendor_detail(vendor: &Vendor) -> String {
    let mut out = format!(
        "{} (#{})\nContact: {}\nEmail:   {}\nPhone:   {}\nStatus:  {}\nCreated: {}",
        vendor.name,
        vendor.id,
        vendor.contact_person,
        vendor.email,
        vendor.phone,
        vendor.status,
        format_date(vendor.created_at.date_naive()),
    );
    if let Some(user) = &vendor.created_by {
        out.push_str(&format!(" by {}", user.username));
    }
    if !vendor.services.is_empty() {
        out.push_str("\n\n");
        out.push_str(&services_table(&vendor.services));
    }
    out
}

pub fn services_table(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services found.".to_string();
    }
    let rows: Vec<Vec<String>> = services
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.service_name.clone(),
                s.vendor.to_string(),
                format_date(s.expiry_date),
                format_date(s.payment_due_date),
                format_currency(s.amount),
                s.status.to_string(),
            ]
        })
        .collect();
    table(
        &["ID", "SERVICE", "VENDOR", "EXPIRES", "PAYMENT DUE", "AMOUNT", "STATUS"],
        &rows,
    )
}

pub fn service_detail(service: &Service) -> String {
    format!(
        "{} (#{})\nVendor:      {}\nStatus:      {}\nAmount:      {}\nStart:       {}\nExpiry:      {} ({})\nPayment due: {} ({})",
        service.service_name,
        service.id,
        service.vendor,
        service.status,
        format_currency(service.amount),
        format_date(service.start_date),
        format_date(service.expiry_date),
        days_label(service.days_until_expiry, "expires"),
        format_date(service.payment_due_date),
        days_label(service.days_until_payment_due, "due"),
    )
}

pub fn stats_summary(stats: &DashboardStats) -> String {
    format!(
        "Vendors:              {} ({} active)\n\
         Services:             {} ({} active)\n\
         Expiring soon:        {}\n\
         Payment due soon:     {}\n\
         Overdue:              {}\n\
         Total contract value: {}",
        stats.total_vendors,
        stats.active_vendors,
        stats.total_services,
        stats.active_services,
        stats.expiring_soon,
        stats.payment_due_soon,
        stats.overdue_services,
        format_currency(stats.total_contract_value),
    )
}

pub fn reminders_table(reminders: &[ServiceReminder]) -> String {
    if reminders.is_empty() {
        return "No reminders.".to_string();
    }
    let rows: Vec<Vec<String>> = reminders
        .iter()
        .map(|r| {
            let kind = match r.reminder_type {
                ReminderType::Expiry => "expiry",
                ReminderType::Payment => "payment",
            };
            vec![
                r.id.to_string(),
                r.service.service_name.clone(),
                kind.to_string(),
                format_date(r.reminder_date),
                if r.is_sent { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    table(&["ID", "SERVICE", "TYPE", "DATE", "SENT"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2025");
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(format_date(date), "Dec 31, 2024");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567.00");
        assert_eq!(format_currency(-12.0), "-$12.00");
    }

    #[test]
    fn test_days_label() {
        assert_eq!(days_label(-3, "due"), "due 3 days ago");
        assert_eq!(days_label(0, "expires"), "expires today");
        assert_eq!(days_label(12, "expires"), "expires in 12 days");
    }

    #[test]
    fn test_table_aligns_columns() {
        let out = table(
            &["ID", "NAME"],
            &[vec!["1".into(), "Acme".into()], vec!["22".into(), "B".into()]],
        );
        assert_eq!(out, "ID  NAME\n--  ----\n1   Acme\n22  B");
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(vendors_table(&[]), "No vendors found.");
        assert_eq!(services_table(&[]), "No services found.");
    }
}
