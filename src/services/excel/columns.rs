use std::collections::HashMap;

use calamine::Data;

use super::types::LoadError;
use super::utils::cell_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Month,
    Category,
    Description,
    Amount,
    CategoryTotal,
    MonthlyTotal,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Month => "month",
            Field::Category => "category",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::CategoryTotal => "category_total",
            Field::MonthlyTotal => "monthly_total",
        }
    }
}

/// Sheet header spellings (lowercased) and the field each one carries.
/// Supporting a new sheet layout means adding rows here.
pub const COLUMN_ALIASES: &[(&str, Field)] = &[
    ("mês", Field::Month),
    ("mes", Field::Month),
    ("month", Field::Month),
    ("categoria", Field::Category),
    ("category", Field::Category),
    ("despesas", Field::Description),
    ("despesa", Field::Description),
    ("description", Field::Description),
    ("expense", Field::Description),
    ("valor (r$)", Field::Amount),
    ("valor (rs)", Field::Amount),
    ("valor", Field::Amount),
    ("amount", Field::Amount),
    ("total categoria", Field::CategoryTotal),
    ("category total", Field::CategoryTotal),
    ("total mensal", Field::MonthlyTotal),
    ("monthly total", Field::MonthlyTotal),
];

pub fn canonical_field(header: &str) -> Option<Field> {
    let header = header.trim().to_lowercase();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == header)
        .map(|(_, field)| *field)
}

/// Column positions of the fields a sheet must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetColumns {
    pub month: usize,
    pub category: usize,
    pub description: usize,
    pub amount: usize,
}

impl SheetColumns {
    pub fn resolve(sheet: &str, header: &[Data]) -> Result<Self, LoadError> {
        let mut positions: HashMap<Field, usize> = HashMap::new();
        for (idx, cell) in header.iter().enumerate() {
            match canonical_field(&cell_text(cell)) {
                Some(field) => {
                    positions.entry(field).or_insert(idx);
                }
                None => tracing::debug!("Sheet {}: ignoring column {:?}", sheet, cell_text(cell)),
            }
        }

        let position = |field: Field| {
            positions.get(&field).copied().ok_or_else(|| LoadError::MissingColumn {
                sheet: sheet.to_string(),
                field: field.name(),
            })
        };

        Ok(SheetColumns {
            month: position(Field::Month)?,
            category: position(Field::Category)?,
            description: position(Field::Description)?,
            amount: position(Field::Amount)?,
        })
    }
}
