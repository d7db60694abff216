//! Basic enumerations shared by the bookkeeping records

use serde::{Deserialize, Deserializer, Serialize};

/// Supplier order transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Goods bought on credit, increases what we owe
    Invoice,
    /// Goods sent back, decreases what we owe
    Return,
    /// Cash paid to the supplier
    Payment,
    /// Cash received from the supplier
    Refund,
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Invoice
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(TransactionType::Invoice),
            "return" => Ok(TransactionType::Return),
            "payment" => Ok(TransactionType::Payment),
            "refund" => Ok(TransactionType::Refund),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Invoice => write!(f, "invoice"),
            TransactionType::Return => write!(f, "return"),
            TransactionType::Payment => write!(f, "payment"),
            TransactionType::Refund => write!(f, "refund"),
        }
    }
}

// Missing, null, empty or unknown types are read as invoices.
impl<'de> Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|s| s.parse().ok())
            .unwrap_or_default())
    }
}

/// Source of a cash ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashEntryKind {
    Sale,
    Refund,
    SupplierPayment,
    SupplierRefund,
    Expense,
}

impl std::fmt::Display for CashEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CashEntryKind::Sale => write!(f, "SALE"),
            CashEntryKind::Refund => write!(f, "REFUND"),
            CashEntryKind::SupplierPayment => write!(f, "SUPPLIER_PAYMENT"),
            CashEntryKind::SupplierRefund => write!(f, "SUPPLIER_REFUND"),
            CashEntryKind::Expense => write!(f, "EXPENSE"),
        }
    }
}

/// Record kinds tracked by the change log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Sale,
    Refund,
    Supplier,
    SupplierOrder,
    Expense,
}

impl std::str::FromStr for EntityType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "sale" => Ok(EntityType::Sale),
            "refund" => Ok(EntityType::Refund),
            "supplier" => Ok(EntityType::Supplier),
            "supplierorder" => Ok(EntityType::SupplierOrder),
            "expense" => Ok(EntityType::Expense),
            _ => Err(format!("Invalid entity type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Sale => write!(f, "sale"),
            EntityType::Refund => write!(f, "refund"),
            EntityType::Supplier => write!(f, "supplier"),
            EntityType::SupplierOrder => write!(f, "supplierOrder"),
            EntityType::Expense => write!(f, "expense"),
        }
    }
}

/// Balance-sign filter used by the supplier views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    /// Every balance
    All,
    /// Balance above zero
    Credit,
    /// Balance below zero
    Debit,
}

impl Default for BalanceMode {
    fn default() -> Self {
        BalanceMode::All
    }
}

impl std::str::FromStr for BalanceMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(BalanceMode::All),
            "credit" => Ok(BalanceMode::Credit),
            "debit" => Ok(BalanceMode::Debit),
            _ => Err(format!("Invalid balance mode: {}", s)),
        }
    }
}

impl std::fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceMode::All => write!(f, "all"),
            BalanceMode::Credit => write!(f, "credit"),
            BalanceMode::Debit => write!(f, "debit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("invoice".parse::<TransactionType>().unwrap(), TransactionType::Invoice);
        assert_eq!("Return".parse::<TransactionType>().unwrap(), TransactionType::Return);
        assert_eq!("payment".parse::<TransactionType>().unwrap(), TransactionType::Payment);
        assert_eq!("refund".parse::<TransactionType>().unwrap(), TransactionType::Refund);
        assert!("credit-note".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_lenient_deserialize() {
        let parsed: Vec<TransactionType> =
            serde_json::from_str(r#"["payment", "", null, "bogus", "RETURN"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                TransactionType::Payment,
                TransactionType::Invoice,
                TransactionType::Invoice,
                TransactionType::Invoice,
                TransactionType::Return,
            ]
        );
    }

    #[test]
    fn test_cash_entry_kind_serialization() {
        let json = serde_json::to_string(&CashEntryKind::SupplierPayment).unwrap();
        assert_eq!(json, "\"SUPPLIER_PAYMENT\"");
        assert_eq!(CashEntryKind::Expense.to_string(), "EXPENSE");
    }

    #[test]
    fn test_entity_type_round_trip_names() {
        assert_eq!(EntityType::SupplierOrder.to_string(), "supplierOrder");
        assert_eq!("supplier-order".parse::<EntityType>().unwrap(), EntityType::SupplierOrder);
        assert_eq!("supplierOrder".parse::<EntityType>().unwrap(), EntityType::SupplierOrder);
        let json = serde_json::to_string(&EntityType::SupplierOrder).unwrap();
        assert_eq!(json, "\"supplierOrder\"");
    }

    #[test]
    fn test_balance_mode_from_str() {
        assert_eq!("credit".parse::<BalanceMode>().unwrap(), BalanceMode::Credit);
        assert_eq!("DEBIT".parse::<BalanceMode>().unwrap(), BalanceMode::Debit);
        assert_eq!(BalanceMode::default(), BalanceMode::All);
    }
}
