//! Shared domain enums

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AgeRange
// ---------------------------------------------------------------------------

/// Reader age classification of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgeRange {
    #[serde(alias = "Livre")]
    General,
    #[serde(alias = "Infantil")]
    Children,
    #[serde(alias = "Infantojuvenil")]
    YoungAdult,
    #[serde(alias = "Adulto")]
    Adult,
}

impl AgeRange {
    pub const ALL: [AgeRange; 4] = [
        AgeRange::General,
        AgeRange::Children,
        AgeRange::YoungAdult,
        AgeRange::Adult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::General => "general",
            AgeRange::Children => "children",
            AgeRange::YoungAdult => "young_adult",
            AgeRange::Adult => "adult",
        }
    }
}

impl std::fmt::Display for AgeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgeRange {
    type Err = String;

    /// Accepts the wire slugs, the variant names and the Portuguese catalog
    /// labels (`Livre`, `Infantil`, `Infantojuvenil`, `Adulto`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" | "livre" => Ok(AgeRange::General),
            "children" | "infantil" => Ok(AgeRange::Children),
            "young_adult" | "youngadult" | "young-adult" | "infantojuvenil" => Ok(AgeRange::YoungAdult),
            "adult" | "adulto" => Ok(AgeRange::Adult),
            _ => Err(format!("Invalid age range: {}", s)),
        }
    }
}

// SQLx conversion for AgeRange (TEXT column with a CHECK constraint)
impl sqlx::Type<Postgres> for AgeRange {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AgeRange {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AgeRange {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}
