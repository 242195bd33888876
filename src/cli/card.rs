use crate::args::apply_card_fields;
use crate::error::NamecardError;
use crate::types::CardPayload;

use super::output::{is_stdout_tty, print_card, print_cards, OutputMode};
use super::session::Session;

pub async fn run_list(session: &Session, mode: OutputMode) -> Result<(), NamecardError> {
    session.require_login()?;
    let cards = session.client.users().cards().await?;
    print_cards(&cards, mode, is_stdout_tty());
    Ok(())
}

pub async fn run_show(session: &Session, id: &str, mode: OutputMode) -> Result<(), NamecardError> {
    session.require_login()?;
    let card = session.client.cards().get(id).await?;
    print_card(&card, mode, is_stdout_tty());
    Ok(())
}

pub async fn run_create(
    session: &Session,
    fields: &[String],
    mode: OutputMode,
) -> Result<(), NamecardError> {
    session.require_login()?;
    let payload = apply_card_fields(CardPayload::default(), fields)?;
    let card = session.client.cards().create(&payload).await?;
    print_card(&card, mode, is_stdout_tty());
    Ok(())
}

/// Fetch the card, overlay the given fields and save the result. Fields not
/// named on the command line keep their current values.
pub async fn run_update(
    session: &Session,
    id: &str,
    fields: &[String],
    mode: OutputMode,
) -> Result<(), NamecardError> {
    session.require_login()?;
    if fields.is_empty() {
        return Err(NamecardError::InvalidArgument(
            "nothing to update; pass fields as key:value".to_string(),
        ));
    }
    let cards = session.client.cards();
    let current = cards.get(id).await?;
    let payload = apply_card_fields(CardPayload::from(&current), fields)?;
    let card = cards.update(id, &payload).await?;
    print_card(&card, mode, is_stdout_tty());
    Ok(())
}

pub async fn run_public(
    session: &Session,
    username: &str,
    mode: OutputMode,
) -> Result<(), NamecardError> {
    let cards = session.client.public().by_username(username).await?;
    print_cards(&cards, mode, is_stdout_tty());
    Ok(())
}
