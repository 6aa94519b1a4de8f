use crate::imports::*;

/*
    Built-in IO services:
    * StdoutInteraction - prints notifications and reads y/n confirmations from stdin
    * StaticConfirmation - answers every confirmation with a fixed value (headless hosts, tests)
*/
pub struct StdoutInteraction;

#[async_trait]
impl PipelineIO for StdoutInteraction {
    async fn notify(&self, message: &str) -> Result<()> {
        println!("{message}");
        Ok(())
    }

    async fn confirm(&self, message: &str) -> Result<Option<bool>> {
        println!("{message} [y/N]");
        let input = tokio::task::spawn_blocking(|| -> Result<String> {
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            Ok(input)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;
        Ok(match input.trim().to_lowercase().as_str() {
            "" => None,
            "y" | "yes" => Some(true),
            _ => Some(false),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticConfirmation(pub bool);

#[async_trait]
impl PipelineIO for StaticConfirmation {
    async fn confirm(&self, message: &str) -> Result<Option<bool>> {
        tracing::debug!(message, answer = self.0, "Static confirmation");
        Ok(Some(self.0))
    }
}
