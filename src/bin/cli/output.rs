use clap::ValueEnum;
use newsteps::dto::{DashboardStatsDto, MessageDto, SessionDto};
use newsteps::models::{Donation, DonationKind, Email, OrderWithItems, Setting, Shoe, User, Volunteer};
use newsteps::notify::templates::format_cents;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

/// Prints any response as pretty JSON
fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not encode response as JSON: {}", e),
    }
}

/// Shared shape of the list printers: JSON, IDs only, or a table
fn print_list<T: Serialize>(
    rows: &[T],
    config: &OutputConfig,
    empty: &str,
    id: impl Fn(&T) -> String,
    table: impl Fn(&[T]),
) {
    match config.format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Human => {
            if rows.is_empty() {
                if !config.quiet {
                    println!("{}", empty);
                }
                return;
            }
            if config.quiet {
                for row in rows {
                    println!("{}", id(row));
                }
                return;
            }
            table(rows);
        }
    }
}

fn describe_donation(donation: &Donation) -> String {
    match donation.get_kind() {
        DonationKind::Shoes => format!("{} pair(s)", donation.get_shoe_count().unwrap_or(0)),
        DonationKind::Money => format_cents(donation.get_amount_cents().unwrap_or(0)),
    }
}

/// Prints the result of a login; quiet mode prints only the token
pub fn print_session(session: &SessionDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(session),
        OutputFormat::Human if config.quiet => println!("{}", session.token),
        OutputFormat::Human => {
            println!("Signed in as {} ({})", session.user.get_email(), session.user.get_role());
            println!("Token: {}", session.token);
            println!();
            println!("export NEWSTEPS_TOKEN={}", session.token);
        }
    }
}

/// Prints a plain acknowledgement
pub fn print_message(message: &MessageDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(message),
        OutputFormat::Human if config.quiet => {}
        OutputFormat::Human => println!("{}", message.message),
    }
}

/// Prints a list of shoes in the specified format
pub fn print_shoes(shoes: &[Shoe], config: &OutputConfig) {
    print_list(shoes, config, "No shoes found.", Shoe::get_id, |shoes| {
        let max_name = shoes.iter().map(|s| s.get_name().len()).max().unwrap_or(4).max(4);
        println!(
            "{:>5}  {:<name_w$}  {:<12}  {:>5}  {:<10}  {:>3}  STATUS",
            "#",
            "NAME",
            "BRAND",
            "SIZE",
            "SPORT",
            "QTY",
            name_w = max_name,
        );
        for shoe in shoes {
            println!(
                "{:>5}  {:<name_w$}  {:<12}  {:>5}  {:<10}  {:>3}  {}",
                shoe.get_display_id(),
                shoe.get_name(),
                shoe.get_brand(),
                shoe.get_size(),
                shoe.get_sport(),
                shoe.get_quantity(),
                shoe.get_status(),
                name_w = max_name,
            );
        }
    });
}

/// Prints a single shoe in the specified format
pub fn print_shoe(shoe: &Shoe, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(shoe),
        OutputFormat::Human if config.quiet => println!("{}", shoe.get_id()),
        OutputFormat::Human => {
            println!("ID:          {}", shoe.get_id());
            println!("Number:      #{}", shoe.get_display_id());
            println!("Name:        {}", shoe.get_name());
            println!("Brand:       {}", shoe.get_brand());
            println!("Gender:      {}", shoe.get_gender());
            println!("Size:        {}", shoe.get_size());
            println!("Sport:       {}", shoe.get_sport());
            println!("Condition:   {}", shoe.get_condition());
            if let Some(description) = shoe.get_description() {
                println!("Description: {}", description);
            }
            if let Some(image) = shoe.get_image_key() {
                println!("Image:       /uploads/{}", image);
            }
            println!("Quantity:    {}", shoe.get_quantity());
            println!("Status:      {}", shoe.get_status());
            if let Some(donation) = shoe.get_donation_id() {
                println!("Donation:    {}", donation);
            }
            println!("Updated:     {}", shoe.get_updated_at());
        }
    }
}

/// Prints a list of donations in the specified format
pub fn print_donations(donations: &[Donation], config: &OutputConfig) {
    print_list(donations, config, "No donations found.", Donation::get_id, |donations| {
        println!("{:<22}  {:<24}  {:<10}  {:<10}  CREATED", "REFERENCE", "DONOR", "GIFT", "STATUS");
        for donation in donations {
            println!(
                "{:<22}  {:<24}  {:<10}  {:<10}  {}",
                donation.get_reference_id(),
                donation.get_donor_email(),
                describe_donation(donation),
                donation.get_status(),
                donation.get_created_at().format("%Y-%m-%d"),
            );
        }
    });
}

/// Prints a single donation with its history
pub fn print_donation(donation: &Donation, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(donation),
        OutputFormat::Human if config.quiet => println!("{}", donation.get_id()),
        OutputFormat::Human => {
            println!("ID:        {}", donation.get_id());
            println!("Reference: {}", donation.get_reference_id());
            println!("Donor:     {} <{}>", donation.get_donor_name(), donation.get_donor_email());
            println!("Gift:      {}", describe_donation(donation));
            if let Some(description) = donation.get_shoe_description() {
                println!("Shoes:     {}", description);
            }
            if let Some(payment) = donation.get_payment_reference() {
                println!("Payment:   {}", payment);
            }
            if let Some(message) = donation.get_message() {
                println!("Message:   {}", message);
            }
            println!("Status:    {}", donation.get_status());
            println!("History:");
            for change in donation.get_status_history().entries() {
                match &change.note {
                    Some(note) => println!("  {}  {:<10}  {}", change.at.format("%Y-%m-%d %H:%M"), change.status, note),
                    None => println!("  {}  {}", change.at.format("%Y-%m-%d %H:%M"), change.status),
                }
            }
        }
    }
}

/// Prints a list of orders in the specified format
pub fn print_orders(orders: &[OrderWithItems], config: &OutputConfig) {
    print_list(orders, config, "No orders found.", |o| o.order.get_id(), |orders| {
        println!("{:<22}  {:>5}  {:<10}  {:<24}  CREATED", "REFERENCE", "PAIRS", "STATUS", "SHIP TO");
        for order in orders {
            let pairs: i32 = order.items.iter().map(|item| item.quantity).sum();
            println!(
                "{:<22}  {:>5}  {:<10}  {:<24}  {}",
                order.order.get_reference_id(),
                pairs,
                order.order.get_status(),
                order.order.get_shipping_address().name,
                order.order.get_created_at().format("%Y-%m-%d"),
            );
        }
    });
}

/// Prints a single order with its lines and history
pub fn print_order(order: &OrderWithItems, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(order),
        OutputFormat::Human if config.quiet => println!("{}", order.order.get_id()),
        OutputFormat::Human => {
            let address = order.order.get_shipping_address();
            println!("ID:        {}", order.order.get_id());
            println!("Reference: {}", order.order.get_reference_id());
            println!("Recipient: {}", order.order.get_recipient_id());
            println!("Status:    {}", order.order.get_status());
            println!("Ship to:   {}", address.name);
            println!("           {}", address.address_line1);
            if let Some(line2) = &address.address_line2 {
                println!("           {}", line2);
            }
            println!("           {}, {} {} {}", address.city, address.state, address.postal_code, address.country);
            if let Some(notes) = order.order.get_notes() {
                println!("Notes:     {}", notes);
            }
            println!("Items:");
            for item in &order.items {
                println!("  {} x {}", item.quantity, item.shoe_id);
            }
            println!("History:");
            for change in order.order.get_status_history().entries() {
                match &change.note {
                    Some(note) => println!("  {}  {:<10}  {}", change.at.format("%Y-%m-%d %H:%M"), change.status, note),
                    None => println!("  {}  {}", change.at.format("%Y-%m-%d %H:%M"), change.status),
                }
            }
        }
    }
}

/// Prints a list of volunteers in the specified format
pub fn print_volunteers(volunteers: &[Volunteer], config: &OutputConfig) {
    print_list(volunteers, config, "No volunteers found.", Volunteer::get_id, |volunteers| {
        let max_name = volunteers.iter().map(|v| v.get_full_name().len()).max().unwrap_or(4).max(4);
        println!("{:<name_w$}  {:<28}  {:<10}  INTERESTS", "NAME", "EMAIL", "STATUS", name_w = max_name);
        for volunteer in volunteers {
            println!(
                "{:<name_w$}  {:<28}  {:<10}  {}",
                volunteer.get_full_name(),
                volunteer.get_email(),
                volunteer.get_status(),
                volunteer.get_interests().join(", "),
                name_w = max_name,
            );
        }
    });
}

/// Prints a single volunteer
pub fn print_volunteer(volunteer: &Volunteer, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(volunteer),
        OutputFormat::Human if config.quiet => println!("{}", volunteer.get_id()),
        OutputFormat::Human => {
            println!("{} <{}> is now {}", volunteer.get_full_name(), volunteer.get_email(), volunteer.get_status());
        }
    }
}

/// Prints site settings; values are shown as compact JSON
pub fn print_settings(settings: &[Setting], config: &OutputConfig) {
    print_list(settings, config, "No settings found.", Setting::get_key, |settings| {
        let max_key = settings.iter().map(|s| s.get_key().len()).max().unwrap_or(3).max(3);
        println!("{:<key_w$}  VALUE", "KEY", key_w = max_key);
        for setting in settings {
            println!("{:<key_w$}  {}", setting.get_key(), setting.get_value(), key_w = max_key);
        }
    });
}

/// Prints a single setting; its value is shown as pretty JSON
pub fn print_setting(setting: &Setting, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(setting),
        OutputFormat::Human if config.quiet => println!("{}", setting.get_value()),
        OutputFormat::Human => {
            println!("{} (updated {})", setting.get_key(), setting.get_updated_at());
            print_json(setting.get_value());
        }
    }
}

/// Prints the dashboard counts
pub fn print_stats(stats: &DashboardStatsDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Human if config.quiet => println!("{}", stats.pairs_available),
        OutputFormat::Human => {
            println!("Pairs available: {}", stats.pairs_available);
            println!("Money raised:    {}", format_cents(stats.money_raised_cents));
            println!("Accounts:        {}", stats.users);
            println!("Emails queued:   {}", stats.pending_emails);
            println!();
            println!("Donations:  {}", join_counts(&stats.donations_by_status));
            println!("Shoes:      {}", join_counts(&stats.shoes_by_status));
            println!("Orders:     {}", join_counts(&stats.orders_by_status));
            println!("Volunteers: {}", join_counts(&stats.volunteers_by_status));
        }
    }
}

fn join_counts<S: std::fmt::Display>(counts: &[(S, i64)]) -> String {
    counts
        .iter()
        .map(|(status, count)| format!("{} {}", count, status))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints outbox emails in the specified format
pub fn print_emails(emails: &[Email], config: &OutputConfig) {
    print_list(emails, config, "No emails found.", Email::get_id, |emails| {
        println!("{:<16}  {:<8}  {:>3}  {:<28}  SUBJECT", "CREATED", "STATUS", "TRY", "TO");
        for email in emails {
            println!(
                "{:<16}  {:<8}  {:>3}  {:<28}  {}",
                email.get_created_at().format("%Y-%m-%d %H:%M"),
                email.get_status(),
                email.get_attempts(),
                email.get_recipient(),
                email.get_subject(),
            );
            if let Some(error) = email.get_last_error() {
                println!("{:>16}  last error: {}", "", error);
            }
        }
    });
}

/// Prints a list of accounts in the specified format
pub fn print_users(users: &[User], config: &OutputConfig) {
    print_list(users, config, "No users found.", User::get_id, |users| {
        let max_id = users.iter().map(|u| u.get_id().len()).max().unwrap_or(2);
        println!("{:<id_w$}  {:<28}  {:<6}  NAME", "ID", "EMAIL", "ROLE", id_w = max_id);
        for user in users {
            println!(
                "{:<id_w$}  {:<28}  {:<6}  {}",
                user.get_id(),
                user.get_email(),
                user.get_role(),
                user.get_name(),
                id_w = max_id,
            );
        }
    });
}

/// Prints a single account
pub fn print_user(user: &User, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Human if config.quiet => println!("{}", user.get_id()),
        OutputFormat::Human => {
            println!("ID:      {}", user.get_id());
            println!("Email:   {}", user.get_email());
            println!("Name:    {}", user.get_name());
            println!("Role:    {}", user.get_role());
            println!("Created: {}", user.get_created_at());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsteps::models::DonationStatus;

    #[test]
    fn test_join_counts() {
        let counts = vec![(DonationStatus::Submitted, 2), (DonationStatus::Received, 0)];
        assert_eq!(join_counts(&counts), "2 submitted, 0 received");
    }
}
