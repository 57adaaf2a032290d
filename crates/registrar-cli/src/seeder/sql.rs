/// Postgres caps a statement at 65535 bind parameters.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Rows per multi-value INSERT for a table with `columns` bound columns.
pub fn batch_size(columns: usize) -> usize {
    (MAX_BIND_PARAMS / columns.max(1)).min(1000)
}

/// `($1, $2), ($3, $4), ...` for `rows` rows of `columns` parameters each.
///
/// A column listed in `casts` gets a `::type` suffix on every row.
pub fn values_clause(rows: usize, columns: usize, casts: &[(usize, &str)]) -> String {
    let mut clause = String::with_capacity(rows * columns * 6);
    for row in 0..rows {
        if row > 0 {
            clause.push_str(", ");
        }
        clause.push('(');
        for column in 0..columns {
            if column > 0 {
                clause.push_str(", ");
            }
            clause.push_str(&format!("${}", row * columns + column + 1));
            if let Some((_, ty)) = casts.iter().find(|(idx, _)| *idx == column) {
                clause.push_str("::");
                clause.push_str(ty);
            }
        }
        clause.push(')');
    }
    clause
}
