//! Plain-text bodies for every notification the site sends

use crate::models::{Donation, DonationKind, OrderWithItems, Volunteer};

/// A rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

impl Message {
    fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { subject: subject.into(), body: body.into() }
    }
}

const SIGNATURE: &str = "\n\nThank you for being part of New Steps Project.\nThe New Steps team";

/// Formats cents as dollars, e.g. `$25.00`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, cents / 100, cents % 100)
}

fn describe_donation(donation: &Donation) -> String {
    match donation.get_kind() {
        DonationKind::Shoes => {
            let count = donation.get_shoe_count().unwrap_or(0);
            format!("{} pair{} of shoes", count, if count == 1 { "" } else { "s" })
        }
        DonationKind::Money => format!("a gift of {}", format_cents(donation.get_amount_cents().unwrap_or(0))),
    }
}

/// Sent to the donor when a donation is recorded
pub fn donation_received(donation: &Donation, public_url: &str) -> Message {
    let next_steps = match donation.get_kind() {
        DonationKind::Shoes => "Please write this reference on the box when you drop off or ship your shoes.",
        DonationKind::Money => "Your gift goes directly toward cleaning, sorting, and shipping shoes.",
    };
    Message::new(
        format!("We received your donation ({})", donation.get_reference_id()),
        format!(
            "Hi {},\n\nThank you for donating {}.\n\nYour reference: {}\n{}\n\nTrack your donation: {}/donations/reference/{}{}",
            donation.get_donor_name(),
            describe_donation(donation),
            donation.get_reference_id(),
            next_steps,
            public_url.trim_end_matches('/'),
            donation.get_reference_id(),
            SIGNATURE
        ),
    )
}

/// Sent to the donor when an admin moves the donation along
pub fn donation_status_changed(donation: &Donation) -> Message {
    let note = donation
        .get_status_history()
        .latest()
        .and_then(|change| change.note.clone())
        .map(|note| format!("\n\nNote from our team: {}", note))
        .unwrap_or_default();
    Message::new(
        format!("Donation {} is now {}", donation.get_reference_id(), donation.get_status()),
        format!(
            "Hi {},\n\nThe status of your donation {} changed to \"{}\".{}{}",
            donation.get_donor_name(),
            donation.get_reference_id(),
            donation.get_status(),
            note,
            SIGNATURE
        ),
    )
}

fn pairs(order: &OrderWithItems) -> i32 {
    order.items.iter().map(|item| item.quantity).sum()
}

/// Sent to the recipient after placing an order
pub fn order_placed(order: &OrderWithItems) -> Message {
    let address = order.order.get_shipping_address();
    Message::new(
        format!("Your shoe request {} was received", order.order.get_reference_id()),
        format!(
            "Hi {},\n\nWe received your request for {} pair(s) of shoes.\n\nReference: {}\nShipping to: {}, {}, {} {}\n\nWe will email you when it ships.{}",
            address.name,
            pairs(order),
            order.order.get_reference_id(),
            address.address_line1,
            address.city,
            address.state,
            address.postal_code,
            SIGNATURE
        ),
    )
}

/// Sent to the admin address when an order comes in
pub fn order_placed_admin(order: &OrderWithItems, recipient_email: &str, public_url: &str) -> Message {
    Message::new(
        format!("New shoe request {}", order.order.get_reference_id()),
        format!(
            "A new request for {} pair(s) was placed by {}.\n\nReview it: {}/orders/{}",
            pairs(order),
            recipient_email,
            public_url.trim_end_matches('/'),
            order.order.get_id()
        ),
    )
}

/// Sent to the recipient when an admin moves the order along
pub fn order_status_changed(order: &OrderWithItems) -> Message {
    let status = order.order.get_status();
    let note = order
        .order
        .get_status_history()
        .latest()
        .and_then(|change| change.note.clone())
        .map(|note| format!("\n\nNote from our team: {}", note))
        .unwrap_or_default();
    Message::new(
        format!("Shoe request {} is now {}", order.order.get_reference_id(), status),
        format!(
            "Hi {},\n\nThe status of your request {} changed to \"{}\".{}{}",
            order.order.get_shipping_address().name,
            order.order.get_reference_id(),
            status,
            note,
            SIGNATURE
        ),
    )
}

/// Sent to the admin address when someone signs up to volunteer
pub fn volunteer_signed_up(volunteer: &Volunteer) -> Message {
    let interests = volunteer.get_interests();
    Message::new(
        format!("New volunteer: {}", volunteer.get_full_name()),
        format!(
            "{} <{}> signed up to volunteer.\n\nPhone: {}\nInterests: {}",
            volunteer.get_full_name(),
            volunteer.get_email(),
            volunteer.get_phone().unwrap_or_else(|| "not given".to_string()),
            if interests.is_empty() { "none given".to_string() } else { interests.join(", ") }
        ),
    )
}

/// Sent when a user asks to reset their password
pub fn password_reset(token: &str, public_url: &str, valid_minutes: i64) -> Message {
    Message::new(
        "Reset your New Steps password",
        format!(
            "Someone asked to reset the password for this account.\n\nReset it here: {}/reset-password?token={}\n\nThe link works once and expires in {} minutes. If you did not ask for this, ignore this email.",
            public_url.trim_end_matches('/'),
            token,
            valid_minutes
        ),
    )
}

/// Sent from the admin dashboard to check delivery settings
pub fn test_email() -> Message {
    Message::new(
        "New Steps test email",
        "This is a test email from the New Steps admin dashboard. If you can read it, delivery works.",
    )
}
