//! Tests for the tour aggregate and lifecycle.

use super::*;
use rstest::{fixture, rstest};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date")
}

fn details(max_participants: Option<u32>) -> TourDetails {
    TourDetails::new("Piz Buin", day(), None, max_participants).expect("valid details")
}

#[fixture]
fn leader_id() -> UserId {
    UserId::random()
}

#[fixture]
fn published(leader_id: UserId) -> Tour {
    let mut tour = Tour::draft(TourId::random(), leader_id, details(Some(2)));
    tour.transition(TourStatus::Published)
        .expect("draft can be published");
    tour
}

#[rstest]
#[case(TourStatus::Draft, TourStatus::Published, true)]
#[case(TourStatus::Draft, TourStatus::Cancelled, true)]
#[case(TourStatus::Published, TourStatus::Cancelled, true)]
#[case(TourStatus::Draft, TourStatus::Draft, false)]
#[case(TourStatus::Published, TourStatus::Draft, false)]
#[case(TourStatus::Published, TourStatus::Published, false)]
#[case(TourStatus::Cancelled, TourStatus::Draft, false)]
#[case(TourStatus::Cancelled, TourStatus::Published, false)]
#[case(TourStatus::Cancelled, TourStatus::Cancelled, false)]
fn lifecycle_table(#[case] from: TourStatus, #[case] to: TourStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
    let result = from.transition_to(to);
    if allowed {
        assert_eq!(result, Ok(to));
    } else {
        assert_eq!(result, Err(TransitionError { from, to }));
    }
}

#[rstest]
#[case("draft", TourStatus::Draft)]
#[case("published", TourStatus::Published)]
#[case("cancelled", TourStatus::Cancelled)]
fn status_parses_from_storage_form(#[case] raw: &str, #[case] expected: TourStatus) {
    assert_eq!(raw.parse::<TourStatus>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[test]
fn unknown_status_is_rejected() {
    let err = "archived".parse::<TourStatus>().expect_err("unknown status");
    assert_eq!(err.input, "archived");
}

#[rstest]
#[case("   ".to_owned(), TourValidationError::EmptyTitle)]
#[case(
    "x".repeat(TOUR_TITLE_MAX + 1),
    TourValidationError::TitleTooLong { max: TOUR_TITLE_MAX }
)]
fn titles_are_validated(#[case] raw: String, #[case] expected: TourValidationError) {
    assert_eq!(TourTitle::new(raw), Err(expected));
}

#[test]
fn title_is_trimmed() {
    let title = TourTitle::new("  Haute Route  ").expect("valid title");
    assert_eq!(title.as_ref(), "Haute Route");
}

#[rstest]
#[case(0, TourValidationError::ZeroCapacity)]
#[case(TOUR_CAPACITY_MAX + 1, TourValidationError::CapacityTooLarge { max: TOUR_CAPACITY_MAX })]
#[case(3_000_000_000, TourValidationError::CapacityTooLarge { max: TOUR_CAPACITY_MAX })]
fn capacities_are_bounded(#[case] capacity: u32, #[case] expected: TourValidationError) {
    let err = TourDetails::new("Piz Buin", day(), None, Some(capacity)).expect_err("bad capacity");
    assert_eq!(err, expected);
}

#[test]
fn largest_capacity_is_accepted() {
    let details = TourDetails::new("Piz Buin", day(), None, Some(TOUR_CAPACITY_MAX))
        .expect("capacity at the bound");
    assert_eq!(details.max_participants, Some(TOUR_CAPACITY_MAX));
}

#[test]
fn blank_description_collapses_to_none() {
    let details =
        TourDetails::new("Piz Buin", day(), Some("  ".to_owned()), None).expect("valid details");
    assert_eq!(details.description, None);
}

#[rstest]
fn drafts_start_empty(leader_id: UserId) {
    let tour = Tour::draft(TourId::random(), leader_id, details(None));
    assert_eq!(tour.status(), TourStatus::Draft);
    assert!(tour.participants().is_empty());
    assert!(!tour.is_full());
}

#[rstest]
fn transition_reports_previous_status(mut published: Tour) {
    let previous = published
        .transition(TourStatus::Cancelled)
        .expect("published can be cancelled");
    assert_eq!(previous, TourStatus::Published);
    assert_eq!(published.status(), TourStatus::Cancelled);
}

#[rstest]
fn failed_transition_leaves_status_untouched(mut published: Tour) {
    let err = published
        .transition(TourStatus::Draft)
        .expect_err("cannot unpublish");
    assert_eq!(err.from, TourStatus::Published);
    assert_eq!(published.status(), TourStatus::Published);
}

#[rstest]
fn reopen_only_applies_to_cancelled_tours(mut published: Tour) {
    assert!(published.reopen().is_err());
    published
        .transition(TourStatus::Cancelled)
        .expect("cancel");
    published.reopen().expect("reopen cancelled tour");
    assert_eq!(published.status(), TourStatus::Draft);
}

#[rstest]
fn reopening_starts_a_fresh_sign_up_list(mut published: Tour) {
    published.add_participant(UserId::random()).expect("join");
    published
        .transition(TourStatus::Cancelled)
        .expect("cancel");
    published.reopen().expect("reopen");
    assert!(published.participants().is_empty());
}

#[rstest]
fn join_fills_up_to_capacity(mut published: Tour) {
    published.add_participant(UserId::random()).expect("first");
    published.add_participant(UserId::random()).expect("second");
    assert!(published.is_full());
    assert_eq!(
        published.add_participant(UserId::random()),
        Err(ParticipationError::Full { capacity: 2 })
    );
}

#[rstest]
fn leader_cannot_join_own_tour(mut published: Tour) {
    let leader = *published.leader_id();
    assert_eq!(
        published.add_participant(leader),
        Err(ParticipationError::LeaderCannotJoin)
    );
}

#[rstest]
fn double_join_is_rejected(mut published: Tour) {
    let member = UserId::random();
    published.add_participant(member).expect("join");
    assert_eq!(
        published.add_participant(member),
        Err(ParticipationError::AlreadyJoined)
    );
}

#[rstest]
fn drafts_do_not_accept_sign_ups(leader_id: UserId) {
    let mut tour = Tour::draft(TourId::random(), leader_id, details(None));
    assert_eq!(
        tour.add_participant(UserId::random()),
        Err(ParticipationError::NotOpen {
            status: TourStatus::Draft
        })
    );
}

#[rstest]
fn cancelled_tours_reject_leaving(mut published: Tour) {
    let member = UserId::random();
    published.add_participant(member).expect("join");
    published
        .transition(TourStatus::Cancelled)
        .expect("cancel");
    assert_eq!(
        published.remove_participant(&member),
        Err(ParticipationError::NotOpen {
            status: TourStatus::Cancelled
        })
    );
}

#[rstest]
fn leaving_requires_membership(mut published: Tour) {
    assert_eq!(
        published.remove_participant(&UserId::random()),
        Err(ParticipationError::NotParticipant)
    );
}

#[rstest]
fn capacity_cannot_drop_below_sign_ups(mut published: Tour) {
    published.add_participant(UserId::random()).expect("first");
    published.add_participant(UserId::random()).expect("second");
    let err = published
        .apply_details(details(Some(1)))
        .expect_err("capacity below sign-ups");
    assert_eq!(
        err,
        TourValidationError::CapacityBelowParticipants {
            capacity: 1,
            participants: 2
        }
    );
    published
        .apply_details(details(None))
        .expect("removing the cap is fine");
    assert_eq!(published.details().max_participants, None);
}

#[rstest]
fn rehydration_rejects_leader_as_participant(leader_id: UserId) {
    let record = TourRecord {
        id: TourId::random(),
        leader_id,
        details: details(None),
        status: TourStatus::Published,
        participants: BTreeSet::from([leader_id]),
    };
    assert_eq!(
        Tour::try_from(record),
        Err(TourValidationError::LeaderListedAsParticipant)
    );
}

#[rstest]
fn change_errors_leave_the_tour_untouched(mut published: Tour) {
    let before = published.clone();
    let err = TourChange::Transition(TourStatus::Draft)
        .apply_to(&mut published)
        .expect_err("cannot unpublish");
    assert!(matches!(err, TourChangeError::Transition(_)));
    assert_eq!(published, before);
}

#[rstest]
fn join_change_adds_participant(mut published: Tour) {
    let member = UserId::random();
    TourChange::Join(member)
        .apply_to(&mut published)
        .expect("join");
    assert!(published.has_participant(&member));
    let err = TourChange::Join(member)
        .apply_to(&mut published)
        .expect_err("double join");
    assert_eq!(
        err,
        TourChangeError::Participation(ParticipationError::AlreadyJoined)
    );
}
