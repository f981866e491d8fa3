use std::fmt;
use std::str::FromStr;

use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Returned when a stored or submitted status string matches no variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} value: {value:?}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a string-backed enum stored as TEXT.
///
/// The first literal of each variant is its canonical spelling; any further
/// literals are older spellings still found in rows written before the
/// statuses were normalized. Parsing is case-insensitive and always yields
/// the canonical variant.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $canonical:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical stored spelling
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $canonical),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
                match normalized.as_str() {
                    $($canonical $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(ParseStatusError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl FromSql<Text, Sqlite> for $name {
            fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
                let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
                Ok(text.parse()?)
            }
        }

        impl ToSql<Text, Sqlite> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.as_str());
                Ok(IsNull::No)
            }
        }
    };
}

text_enum! {
    /// Access level of an account
    Role {
        User => "user",
        Admin => "admin" | "administrator",
    }
}

text_enum! {
    /// What a donor is giving
    DonationKind {
        Shoes => "shoes" | "shoe",
        Money => "money" | "monetary",
    }
}

text_enum! {
    /// Lifecycle of a donation from intake to processing
    DonationStatus {
        Submitted => "submitted" | "pending" | "donated",
        Received => "received" | "delivered",
        Processed => "processed" | "complete" | "completed",
        Cancelled => "cancelled" | "canceled",
    }
}

text_enum! {
    /// Availability of a shoe inventory item
    ShoeStatus {
        Available => "available",
        OutOfStock => "out_of_stock" | "outofstock" | "unavailable" | "requested",
        Hidden => "hidden",
    }
}

text_enum! {
    /// Lifecycle of a recipient's shoe request
    OrderStatus {
        Pending => "pending" | "requested" | "submitted",
        Confirmed => "confirmed" | "approved",
        Shipped => "shipped",
        Delivered => "delivered" | "completed",
        Cancelled => "cancelled" | "canceled",
    }
}

text_enum! {
    /// Where a volunteer application stands
    VolunteerStatus {
        New => "new",
        Contacted => "contacted",
        Active => "active",
        Inactive => "inactive",
    }
}

text_enum! {
    /// Delivery state of an outbox email
    EmailStatus {
        Pending => "pending",
        Sent => "sent",
        Failed => "failed",
    }
}

impl DonationStatus {
    /// Returns true if a donation in this status may move to `next`
    pub fn can_transition_to(self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, next),
            (Submitted, Received) | (Submitted, Cancelled) | (Received, Processed) | (Received, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DonationStatus::Processed | DonationStatus::Cancelled)
    }
}

impl OrderStatus {
    /// Returns true if an order in this status may move to `next`
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl ShoeStatus {
    /// The status a visible item has when `quantity` pairs are on hand
    pub fn for_quantity(quantity: i32) -> ShoeStatus {
        if quantity > 0 {
            ShoeStatus::Available
        } else {
            ShoeStatus::OutOfStock
        }
    }

    /// Recomputes the status after the on-hand count changed.
    /// Hidden items stay hidden.
    pub fn after_stock_change(self, quantity: i32) -> ShoeStatus {
        match self {
            ShoeStatus::Hidden => ShoeStatus::Hidden,
            _ => ShoeStatus::for_quantity(quantity),
        }
    }
}


#[cfg(test)]
mod prop_tests;
