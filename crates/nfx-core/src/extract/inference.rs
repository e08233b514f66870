//! Completion of line-item amounts from `total = quantity * unit_price`.

/// The three numeric fields of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Amounts {
    /// Quantity.
    pub quantity: Option<f64>,
    /// Unit price.
    pub unit_price: Option<f64>,
    /// Total price.
    pub total_price: Option<f64>,
}

impl Amounts {
    /// Create from the three parsed fields.
    pub fn new(quantity: Option<f64>, unit_price: Option<f64>, total_price: Option<f64>) -> Self {
        Self {
            quantity,
            unit_price,
            total_price,
        }
    }

    /// Whether at least one field has a value.
    pub fn any_present(&self) -> bool {
        self.quantity.is_some() || self.unit_price.is_some() || self.total_price.is_some()
    }

    /// Fill a single missing (or zero) field from the other two.
    ///
    /// The rules run once, in order: total, then unit price, then quantity.
    /// A later rule sees values produced by an earlier one, but nothing is
    /// re-evaluated, so a triple needing two corrections stays inconsistent.
    pub fn infer(self) -> Self {
        let Amounts {
            mut quantity,
            mut unit_price,
            mut total_price,
        } = self;

        let missing = |v: Option<f64>| v.is_none_or(|v| v == 0.0);

        if let (Some(q), Some(u)) = (quantity, unit_price) {
            if missing(total_price) {
                total_price = Some(q * u);
            }
        }

        if let (Some(q), Some(t)) = (quantity, total_price) {
            if missing(unit_price) && q != 0.0 {
                unit_price = Some(t / q);
            }
        }

        if let (Some(u), Some(t)) = (unit_price, total_price) {
            if missing(quantity) && u != 0.0 {
                quantity = Some(t / u);
            }
        }

        Self {
            quantity,
            unit_price,
            total_price,
        }
    }
}
