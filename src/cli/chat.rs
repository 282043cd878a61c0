use crate::cli::commands::ChatArgs;
use crate::config::CrmBotConfig;
use crate::dispatch::{Dispatcher, DocumentSource, Reply};
use crate::errors::CrmBotError;

/// Send one message through the same dispatcher the server uses and print
/// the reply.
pub async fn handle_chat(args: ChatArgs, config: CrmBotConfig) -> Result<(), CrmBotError> {
    let dispatcher = Dispatcher::from_config(&config)?;

    match dispatcher.handle(args.caller, &args.text).await {
        Reply::Text { text, keyboard } => {
            println!("{}", text);
            for row in keyboard.unwrap_or_default() {
                println!("  [{}]", row.join("] ["));
            }
        }
        Reply::Document { file_name, caption, source, .. } => {
            let path = match source {
                DocumentSource::Bytes(bytes) => super::write_output(&args.output, &file_name, &bytes).await?,
                DocumentSource::Path(path) => path,
            };
            println!("{}", caption);
            println!("  {}", path.display());
        }
    }
    Ok(())
}
