use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};

use super::{SettingValue, StatusHistory};

/// Stores a serde type as JSON in a TEXT column.
///
/// The type's own `Serialize`/`Deserialize` impls decide the shape, so
/// transparent newtypes are stored as their inner value.
macro_rules! json_text_column {
    ($($name:ty),+ $(,)?) => {
        $(
            impl FromSql<Text, Sqlite> for $name {
                fn from_sql(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
                    let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
                    Ok(serde_json::from_str(&text)?)
                }
            }

            impl ToSql<Text, Sqlite> for $name {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                    out.set_value(serde_json::to_string(self)?);
                    Ok(IsNull::No)
                }
            }
        )+
    };
}

json_text_column!(SettingValue, StatusHistory);
