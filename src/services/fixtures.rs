//! Sample sheets shared by service and route tests.

use calamine::Data;

use crate::models::Dataset;
use crate::services::excel::loader::normalize_sheet;

pub fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

pub fn row(month: &str, category: &str, description: &str, amount: Data) -> Vec<Data> {
    vec![text(month), text(category), text(description), amount]
}

/// Mohamed keeps Jan and Mar (Feb nets to zero); Evelyn keeps Jan and Mar
/// (Apr totals zero). Her sheet uses the upper-case header spelling.
pub fn sample_dataset() -> Dataset {
    let mohamed = vec![
        vec![
            text("Mês"),
            text("Categoria"),
            text("Despesas"),
            text("Valor (R$)"),
            text("Total Categoria"),
            text("Total Mensal"),
        ],
        row("Jan", "Food", "Lunch", Data::Float(20.0)),
        row("Jan", "Food", "Bad", text("x")),
        row("Jan", "Home", "Rent", Data::Float(1000.0)),
        row("Feb", "Food", "Lunch", Data::Float(10.0)),
        row("Feb", "Food", "Refund", Data::Float(-10.0)),
        row("Mar", "Transport", "Bus", Data::Float(5.5)),
        row("Mar", "Food", "Lunch", Data::Int(30)),
    ];
    let evelyn = vec![
        vec![
            text(" MES "),
            text("CATEGORIA"),
            text("DESPESAS"),
            text("VALOR (RS)"),
            text("TOTAL CATEGORIA"),
            text("TOTAL MENSAL"),
        ],
        row("Jan", "Food", "Lunch", Data::Float(15.0)),
        row("Jan", "Health", "Gym", text("50")),
        row("Mar", "Food", "Lunch", Data::Float(25.0)),
        row("Apr", "Home", "Rent", Data::Float(0.0)),
    ];

    Dataset::from_tables(vec![
        normalize_sheet("Mohamed", "Mohamed", &mohamed).expect("fixture sheet"),
        normalize_sheet("Evelyn", "Evelyn", &evelyn).expect("fixture sheet"),
    ])
}

/// Writes an xlsx workbook in memory. Amounts that parse as numbers are
/// stored as numeric cells, everything else as text.
pub fn workbook_bytes(sheets: &[(&str, Vec<[&str; 4]>)]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet name");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                let (row_num, col_num) = (row_idx as u32, col_idx as u16);
                match value.parse::<f64>() {
                    Ok(number) if row_idx > 0 && col_idx == 3 => {
                        worksheet.write_number(row_num, col_num, number).expect("number cell");
                    }
                    _ => {
                        worksheet.write_string(row_num, col_num, *value).expect("text cell");
                    }
                }
            }
        }
    }
    workbook.save_to_buffer().expect("xlsx buffer")
}

/// Both header spellings, an unparsable amount, and a February that nets to zero.
pub fn sample_workbook() -> Vec<u8> {
    workbook_bytes(&[
        (
            "Mohamed",
            vec![
                ["Mês", "Categoria", "Despesas", "Valor (R$)"],
                ["Jan", "Food", "Lunch", "20"],
                ["Jan", "Food", "Bad", "x"],
                ["Feb", "Food", "Lunch", "10"],
                ["Feb", "Food", "Refund", "-10"],
            ],
        ),
        (
            "Evelyn",
            vec![
                [" MES ", "CATEGORIA", "DESPESAS", "VALOR (RS)"],
                ["Jan", "Food", "Bus", "3.5"],
            ],
        ),
    ])
}
