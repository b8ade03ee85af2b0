mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use meshperf::prelude::*;
    use meshperf::{Field, RuntimeError, MSG_BOARDS_UNAVAILABLE, MSG_PROFILE_SAVE_FAILED};
    use ntest::timeout;

    #[tokio::test]
    #[timeout(5000)]
    async fn saving_twice_keeps_one_record() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator.form_mut().set(Field::ProfileName, "checkout");

        let first = orchestrator.save_profile().await.unwrap();
        let id = first.id.clone().unwrap();
        assert_eq!(orchestrator.session().profile_id(), Some(id.as_str()));

        let second = orchestrator.save_profile().await.unwrap();
        assert_eq!(second.id, Some(id));
        assert_eq!(mock.state().profile_count(), 1);
        assert!(notifier.contains(
            EventType::Success,
            "Performance profile checkout has been created"
        ));
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn rejected_profile_notifies() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator.form_mut().set(Field::ProfileName, "reject");

        let err = orchestrator.save_profile().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Client(_)));
        assert!(notifier.contains(EventType::Error, MSG_PROFILE_SAVE_FAILED));
        assert_eq!(orchestrator.session().profile_id(), None);
        assert_eq!(mock.state().profile_count(), 0);

        // The same failure while submitting ends the attempt.
        assert!(orchestrator.submit().await.is_err());
        assert_eq!(orchestrator.phase(), Phase::Idle);
        assert!(mock.state().run_queries().is_empty());
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn malformed_options_still_save() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test");
        orchestrator
            .form_mut()
            .set(Field::AdditionalOptions, "{\"-H\": ");
        assert!(orchestrator.session().form().errors().additional_options.is_some());

        let saved = orchestrator.save_profile().await.unwrap();
        let fetched = orchestrator
            .client()
            .fetch_profile(saved.id.as_deref().unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.metadata.additional_options, vec!["{\"-H\": "]);
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn load_profile_populates_form() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);
        fill_form(&mut orchestrator, "http://x.test/cart");
        orchestrator.form_mut().set(Field::ProfileName, "cart");
        orchestrator.form_mut().set(Field::LoadGenerator, "nighthawk");
        let id = orchestrator.save_profile().await.unwrap().id.unwrap();

        orchestrator.reset();
        assert_eq!(orchestrator.session().profile_id(), None);
        assert_eq!(orchestrator.session().form().url, "");

        orchestrator.load_profile(&id).await.unwrap();
        let form = orchestrator.session().form();
        assert_eq!(form.profile_id.as_deref(), Some(id.as_str()));
        assert_eq!(form.profile_name, "cart");
        assert_eq!(form.url, "http://x.test/cart");
        assert_eq!(form.concurrency, "10");
        assert_eq!(form.load_generator, LoadGenerator::Nighthawk);

        assert!(orchestrator.load_profile("missing").await.is_err());
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn list_profiles_pages() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);

        for name in ["a", "b", "c"] {
            orchestrator.reset();
            fill_form(&mut orchestrator, "http://x.test");
            orchestrator.form_mut().set(Field::ProfileName, name);
            orchestrator.save_profile().await.unwrap();
        }

        let page = orchestrator.list_profiles(0, 2).await.unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_size, 2);
        let names: Vec<_> = page.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let page = orchestrator.list_profiles(1, 2).await.unwrap();
        assert_eq!(page.profiles.len(), 1);
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn refresh_applies_environment() {
        let mock = mock().await;
        let notifier = RecordingNotifier::new();
        let mut orchestrator = runtime(&mock, &notifier)
            .cluster(&["c1".to_string()])
            .build()
            .unwrap();

        orchestrator.refresh().await;

        let session = orchestrator.session();
        let form = session.form();
        assert_eq!(form.qps, "20");
        assert_eq!(form.concurrency, "4");
        assert_eq!(form.duration, "1m");
        assert_eq!(form.load_generator, LoadGenerator::Wrk2);

        assert!(session.has_static_board());
        let boards = session.static_board().unwrap();
        assert_eq!(boards.cluster.test_uuid, Some(session.test_uuid()));

        assert_eq!(
            session.meshes().options(),
            vec!["Istio", "Linkerd", "Open Service Mesh"]
        );
        assert_eq!(session.meshes().selected(), Some("open_service_mesh"));
        assert!(notifier.history().is_empty());
    }

    #[tokio::test]
    #[timeout(5000)]
    async fn unavailable_boards_warn() {
        let mock = mock().await;
        mock.state().set_boards_available(false);
        let notifier = RecordingNotifier::new();
        let mut orchestrator = orchestrator(&mock, &notifier);

        orchestrator.refresh().await;

        assert!(!orchestrator.session().has_static_board());
        assert!(notifier.contains(EventType::Warning, MSG_BOARDS_UNAVAILABLE));
        // Without a configured cluster only the SMP meshes are offered.
        assert_eq!(
            orchestrator.session().meshes().values(),
            vec!["istio", "linkerd", "open service mesh"]
        );
    }
}
