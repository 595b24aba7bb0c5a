use crate::models::{WizardFlow, WizardStep};

use WizardStep::*;

const BOOKING_STEPS: [WizardStep; 5] = [
    CollectAgency,
    CollectSpecialization,
    CollectAdviserDateTime,
    CollectContactInfo,
    Committed,
];

const MODIFICATION_STEPS: [WizardStep; 7] = [
    CollectPhone,
    SelectExistingAppointment,
    CollectAgency,
    CollectSpecialization,
    CollectAdviserDateTime,
    CollectContactInfo,
    Committed,
];

/// Ordered steps of a flow. Forward moves go one position at a time; backward
/// moves may go to any earlier position except out of `Committed`.
pub fn steps(flow: WizardFlow) -> &'static [WizardStep] {
    match flow {
        WizardFlow::Booking => &BOOKING_STEPS,
        WizardFlow::Modification => &MODIFICATION_STEPS,
    }
}

pub fn first_step(flow: WizardFlow) -> WizardStep {
    steps(flow)[0]
}

pub fn position(flow: WizardFlow, step: WizardStep) -> Option<usize> {
    steps(flow).iter().position(|s| *s == step)
}

pub fn next_step(flow: WizardFlow, step: WizardStep) -> Option<WizardStep> {
    let index = position(flow, step)?;
    steps(flow).get(index + 1).copied()
}

pub fn previous_step(flow: WizardFlow, step: WizardStep) -> Option<WizardStep> {
    let index = position(flow, step)?;
    index.checked_sub(1).map(|i| steps(flow)[i])
}

/// Whether `target` is reachable by going back from `current`.
pub fn can_go_back_to(flow: WizardFlow, current: WizardStep, target: WizardStep) -> bool {
    if current == Committed {
        return false;
    }
    match (position(flow, current), position(flow, target)) {
        (Some(current), Some(target)) => target < current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_flow_walks_forward_to_committed() {
        let mut step = first_step(WizardFlow::Booking);
        let mut visited = vec![step];
        while let Some(next) = next_step(WizardFlow::Booking, step) {
            visited.push(next);
            step = next;
        }

        assert_eq!(visited, BOOKING_STEPS.to_vec());
        assert_eq!(step, Committed);
    }

    #[test]
    fn test_modification_flow_starts_with_phone() {
        assert_eq!(first_step(WizardFlow::Modification), CollectPhone);
        assert_eq!(
            next_step(WizardFlow::Modification, SelectExistingAppointment),
            Some(CollectAgency)
        );
    }

    #[test]
    fn test_steps_outside_the_flow_have_no_neighbours() {
        assert_eq!(next_step(WizardFlow::Booking, CollectPhone), None);
        assert_eq!(previous_step(WizardFlow::Booking, SelectExistingAppointment), None);
        assert_eq!(previous_step(WizardFlow::Booking, CollectAgency), None);
    }

    #[test]
    fn test_back_navigation_rules() {
        let flow = WizardFlow::Modification;
        assert!(can_go_back_to(flow, CollectContactInfo, CollectPhone));
        assert!(can_go_back_to(flow, CollectAdviserDateTime, CollectSpecialization));
        assert!(!can_go_back_to(flow, CollectAgency, CollectContactInfo));
        assert!(!can_go_back_to(flow, CollectAgency, CollectAgency));
        assert!(!can_go_back_to(flow, Committed, CollectAgency));
        assert!(!can_go_back_to(WizardFlow::Booking, CollectContactInfo, CollectPhone));
    }
}
