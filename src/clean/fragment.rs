/// A cell as extracted: `None` is the explicit missing marker (an empty cell
/// region in the PDF table), `Some("")` is a present-but-blank value.
pub type Cell = Option<String>;

/// One raw table fragment, one per extracted page region.
///
/// Columns are positional: `headers[c]` names column `c` in every row.
/// Fragments are mutated in place through the cleaning stages and discarded
/// once concatenated into the final table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Column names as the extractor reported them (first extracted row).
    pub headers: Vec<String>,
    /// Data rows, one `Cell` per column.
    pub rows: Vec<Vec<Cell>>,
}

impl Fragment {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the column named `name`, if any.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Insert an empty column at `at`, shifting later columns right.
    /// Cells are filled with `Some("")`, not the missing marker.
    pub fn insert_column(&mut self, at: usize, name: String) {
        self.headers.insert(at, name);
        for row in &mut self.rows {
            row.insert(at, Some(String::new()));
        }
    }

    /// Keep only the columns whose index passes `keep`, in order.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.headers.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.retain(|_| {
                let k = keep[idx];
                idx += 1;
                k
            });
        }
    }
}

/// The six canonical statement fields, identified by their fixed header
/// vocabulary rather than by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BookingDate,
    Currency,
    Amount,
    Balance,
    Summary,
    Counterparty,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::BookingDate,
        Field::Currency,
        Field::Amount,
        Field::Balance,
        Field::Summary,
        Field::Counterparty,
    ];

    /// Canonical header text as printed on the statement.
    pub fn name(self) -> &'static str {
        match self {
            Field::BookingDate => "记账日期",
            Field::Currency => "货币",
            Field::Amount => "交易金额",
            Field::Balance => "联机余额",
            Field::Summary => "交易摘要",
            Field::Counterparty => "对手信息",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}
