use serde::{Deserialize, Serialize};

use super::enums::{PaymentMethod, ServiceType};
use super::patient::PatientId;

/// Payment recorded at the counter (local).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub patient_name: String,
    pub date: String,
    pub service: ServiceType,
    pub amount: u64,
    pub method: PaymentMethod,
}

/// Row from `GET /payments/unpaid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpaidPayment {
    pub payment_id: u64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub status: String,
    pub appointment_id: u64,
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub appointment_time: Option<String>,
    pub patient_id: PatientId,
    pub patient_name: String,
}

/// Amounts arrive as JSON numbers or, for SQL `DECIMAL` columns, as strings
/// like `"500.00"`.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct Amount;

    impl<'de> de::Visitor<'de> for Amount {
        type Value = f64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(Amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(amount: &str) -> String {
        format!(
            r#"{{"payment_id":7,"amount":{amount},"status":"unpaid","appointment_id":3,
                "patient_id":2,"patient_name":"สมหญิง รักสุข"}}"#
        )
    }

    #[test]
    fn unpaid_amount_accepts_decimal_string() {
        let p: UnpaidPayment = serde_json::from_str(&row(r#""500.00""#)).unwrap();
        assert_eq!(p.amount, 500.0);
        assert_eq!(p.appointment_date, None);
    }

    #[test]
    fn unpaid_amount_accepts_numbers() {
        let p: UnpaidPayment = serde_json::from_str(&row("0")).unwrap();
        assert_eq!(p.amount, 0.0);
        let p: UnpaidPayment = serde_json::from_str(&row("350.5")).unwrap();
        assert_eq!(p.amount, 350.5);
    }

    #[test]
    fn unpaid_amount_rejects_non_numeric_string() {
        let err = serde_json::from_str::<UnpaidPayment>(&row(r#""free""#)).unwrap_err();
        assert!(err.to_string().contains("numeric string"));
    }
}
