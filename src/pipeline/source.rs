use crate::imports::*;

pub const REPLACE_SOURCE_PROMPT: &str =
    "Changing the source will remove all the existing operations. Do you want to continue?";

/*
    Types:
    * SourceArgs - The two ways to set a pipeline's root:
        - Table: a fresh root table on a data source
        - Pipeline: clone a whole serialized pipeline, replacing data source and operations
*/
#[derive(Debug, Clone)]
pub enum SourceArgs {
    Table { table: Table, data_source: String },
    Pipeline(PipelineData),
}

impl Pipeline {
    /// Replaces the root of the pipeline. A non-empty pipeline asks the registered IO services
    /// for confirmation first; returns false if the change was declined.
    #[tracing::instrument(skip(self, args), fields(operation_count = self.operations().len()))]
    pub async fn set_source(&mut self, args: SourceArgs) -> Result<bool> {
        if !self.is_empty() {
            let accepted = self
                .services()
                .confirm(REPLACE_SOURCE_PROMPT)
                .await
                .context("Failed to confirm source change")?;
            if !accepted {
                tracing::debug!("Source change declined");
                return Ok(false);
            }
        }

        match args {
            SourceArgs::Table { table, data_source } => {
                tracing::debug!(
                    table = %table.table_name,
                    data_source = %data_source,
                    "Setting source table"
                );
                self.load(PipelineData {
                    data_source: Some(data_source),
                    operations: Vec::new(),
                    active_operation_idx: -1,
                });
                self.add_source(table);
            }
            SourceArgs::Pipeline(data) => {
                tracing::debug!(
                    data_source = ?data.data_source,
                    operation_count = data.operations.len(),
                    "Cloning pipeline as source"
                );
                let active_operation_idx = data.operations.len() as isize - 1;
                self.load(PipelineData {
                    active_operation_idx,
                    ..data
                });
            }
        }
        Ok(true)
    }
}
