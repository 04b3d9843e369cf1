use std::time::Duration;

use qb_core::{
    CoreError, Session, bank,
    evaluate::submit_answer,
    export::{BankExport, export_bank_data},
};
use qb_db::models::QuestionFilter;

use crate::common::{self, TestStateBuilder};

#[tokio::test]
async fn test_watch_banks_redelivers_after_import() -> anyhow::Result<()> {
    let state = TestStateBuilder::new().build().await?;

    let mut banks = bank::watch_banks(&state).await?;
    assert!(banks.current().is_empty());

    let bank_id =
        common::import(&state, &common::single_choice_document("doc", 2), "Watched").await?;

    let delivered = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match banks.next().await {
                Some(list) if !list.is_empty() => break Some(list),
                Some(_) => continue,
                None => break None,
            }
        }
    })
    .await?
    .expect("live sequence stopped");

    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, bank_id);
    assert_eq!(delivered[0].name, "Watched");

    Ok(())
}

#[tokio::test]
async fn test_list_and_get_banks() -> anyhow::Result<()> {
    let state = TestStateBuilder::new().build().await?;
    let first = common::import(&state, &common::single_choice_document("a", 1), "A").await?;
    let second = common::import(&state, &common::single_choice_document("b", 1), "B").await?;

    let banks = bank::list_banks(&state).await?;
    assert_eq!(banks.len(), 2);
    assert!(banks.iter().any(|b| b.id == first));
    assert!(banks.iter().any(|b| b.id == second));

    assert_eq!(
        bank::get_bank(&state, &first).await?.map(|b| b.name),
        Some("A".to_string())
    );
    assert!(bank::get_bank(&state, "bank_missing").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_delete_bank_removes_questions_and_history() -> anyhow::Result<()> {
    let state = TestStateBuilder::new().build().await?;
    let bank_id =
        common::import(&state, &common::single_choice_document("doc", 3), "Doomed").await?;
    let keep_id = common::import(&state, &common::single_choice_document("doc", 3), "Kept").await?;

    let question = state
        .store
        .get_question(&format!("{bank_id}_q1"))
        .await?
        .expect("question");
    submit_answer(&state.store, &question, "B").await?;
    assert_eq!(bank::learning_history(&state, &bank_id).await?.len(), 1);

    bank::delete_bank(&state, &bank_id).await?;

    assert!(bank::get_bank(&state, &bank_id).await?.is_none());
    assert!(
        state
            .store
            .list_questions(&bank_id, QuestionFilter::All)
            .await?
            .is_empty()
    );
    assert!(state.store.list_records(&bank_id).await?.is_empty());
    assert!(state.store.get_question(&question.id).await?.is_none());

    // The other bank is untouched
    assert_eq!(
        state
            .store
            .list_questions(&keep_id, QuestionFilter::All)
            .await?
            .len(),
        3
    );

    let again = bank::delete_bank(&state, &bank_id).await;
    assert!(matches!(again, Err(CoreError::NotFound { .. })));
    let history = bank::learning_history(&state, &bank_id).await;
    assert!(matches!(history, Err(CoreError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_learning_history_newest_first() -> anyhow::Result<()> {
    let state = TestStateBuilder::new().build().await?;
    let bank_id =
        common::import(&state, &common::single_choice_document("doc", 2), "History").await?;

    let mut session = Session::new(state.clone());
    session.load_bank(&bank_id).await?;
    session.toggle_answer_tag("A");
    session.submit().await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    session.advance(qb_core::Direction::Next);
    session.toggle_answer_tag("B");
    session.submit().await;
    session.close().await;

    let history = bank::learning_history(&state, &bank_id).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question_id, format!("{bank_id}_q2"));
    assert!(history[0].is_correct);
    assert_eq!(history[1].question_id, format!("{bank_id}_q1"));
    assert_eq!(history[1].user_answer, "A");
    assert!(!history[1].is_correct);

    Ok(())
}

#[tokio::test]
async fn test_export_contains_full_bank_and_reads_back() -> anyhow::Result<()> {
    let state = TestStateBuilder::new().build().await?;
    let bank_id = common::import(&state, &common::mixed_document("mixed"), "Exported").await?;

    let mut session = Session::new(state.clone());
    session.load_bank(&bank_id).await?;
    session.toggle_favorite();
    session.toggle_answer_tag("B");
    session.submit().await;
    session.close().await;

    let json = export_bank_data(&state, &bank_id).await?;
    let export = BankExport::from_json(json.as_bytes())?;

    let bank = state.store.get_bank(&bank_id).await?.expect("bank");
    assert_eq!(export.bank, bank);
    assert_eq!(export.records.len(), 1);

    let stored = state.store.list_questions(&bank_id, QuestionFilter::All).await?;
    let exported: Vec<_> = export.questions.iter().map(|q| q.question.clone()).collect();
    assert_eq!(exported, stored);

    let first = &export.questions[0];
    assert!(first.question.is_favorite);
    assert!(first.question.is_completed);
    assert_eq!(first.options.len(), 4);

    let multi = &export.questions[1];
    let option_tags: Vec<_> = multi.options.iter().map(|o| o.tag.as_str()).collect();
    assert_eq!(option_tags, ["D", "A", "C", "B"]);

    let missing = export_bank_data(&state, "bank_missing").await;
    assert!(matches!(missing, Err(CoreError::NotFound { .. })));

    let wrong_format = json.replace("quizbank-export/1", "something-else");
    assert!(matches!(
        BankExport::from_json(wrong_format.as_bytes()),
        Err(CoreError::Format(_))
    ));

    Ok(())
}
