use crate::imports::*;
use crate::operations::constructors as op;

// The editing surface used by UI actions. Each method builds one operation and inserts it
// through add_operation, so the truncation rule holds for all of them.
impl Pipeline {
    pub fn add_source(&mut self, table: Table) {
        self.add_operation(op::source(table));
    }

    pub fn add_join(&mut self, join: Join) {
        self.add_operation(Operation::Join(join));
    }

    /// Accepts a single filter or a list; each becomes its own step, in order.
    pub fn add_filter(&mut self, filters: impl Into<Vec<Filter>>) {
        for filter in filters.into() {
            self.add_operation(Operation::Filter(filter));
        }
    }

    pub fn add_mutate(&mut self, mutate: Mutate) {
        self.add_operation(Operation::Mutate(mutate));
    }

    pub fn add_summarize(&mut self, summarize: Summarize) {
        self.add_operation(Operation::Summarize(summarize));
    }

    pub fn add_pivot_wider(&mut self, pivot: PivotWider) {
        self.add_operation(Operation::PivotWider(pivot));
    }

    /// Sorts are unique per column within the active steps: an identical sort is ignored, a sort
    /// on the same column with another direction is replaced where it stands.
    pub fn add_order_by(&mut self, order_by: OrderBy) {
        let existing = self.current_operations().iter().enumerate().find_map(|(idx, op)| {
            op.as_order_by()
                .filter(|o| o.column.column_name == order_by.column.column_name)
                .map(|o| (idx, o.direction))
        });
        match existing {
            Some((_, direction)) if direction == order_by.direction => {
                tracing::debug!(
                    column = %order_by.column.column_name,
                    direction = order_by.direction.as_str(),
                    "Sort already present, ignoring"
                );
            }
            Some((idx, _)) => self.replace_operation(idx, Operation::OrderBy(order_by)),
            None => self.add_operation(Operation::OrderBy(order_by)),
        }
    }

    /// Removes the first active sort on `column_name`, if any.
    pub fn remove_order_by(&mut self, column_name: &str) {
        let found = self.current_operations().iter().position(|op| {
            op.as_order_by()
                .is_some_and(|o| o.column.column_name == column_name)
        });
        if let Some(idx) = found {
            self.remove_at(idx);
        }
    }

    // Multiple limits may coexist, unlike sorts.
    pub fn add_limit(&mut self, limit: u64) {
        self.add_operation(op::limit(limit));
    }

    pub fn select_columns(&mut self, column_names: impl IntoIterator<Item = impl Into<String>>) {
        self.add_operation(op::select(column_names));
    }

    pub fn rename_column(&mut self, column_name: &str, new_name: &str) {
        self.add_operation(op::rename(op::column(column_name), new_name));
    }

    pub fn remove_column(&mut self, column_names: impl IntoIterator<Item = impl Into<String>>) {
        self.add_operation(op::remove(column_names));
    }

    pub fn change_column_type(&mut self, column_name: &str, data_type: ColumnDataType) {
        self.add_operation(op::cast(op::column(column_name), data_type));
    }
}

impl From<Filter> for Vec<Filter> {
    fn from(filter: Filter) -> Self {
        vec![filter]
    }
}
