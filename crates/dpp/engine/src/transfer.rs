//! Ownership transfer protocol: ship, flag transport alerts, accept or reject on arrival.

use dpp_types::{Dpp, DppError, DppStatus, TRANSPORT_ALERT_SUFFIX};

/// Checks that `caller` may ship the record to `new_owner`.
pub fn ensure_can_ship(dpp: &Dpp, caller: &str, new_owner: &str) -> Result<(), DppError> {
    if dpp.owner_org() != caller {
        return Err(DppError::Unauthorized(format!(
            "only the current owner {} may transfer record {}, caller is {}",
            dpp.owner_org(),
            dpp.id(),
            caller
        )));
    }
    if new_owner.trim().is_empty() {
        return Err(DppError::validation("new owner is empty"));
    }
    if new_owner.ends_with(TRANSPORT_ALERT_SUFFIX) {
        return Err(DppError::validation(format!(
            "organization name {} clashes with the {} status suffix",
            new_owner, TRANSPORT_ALERT_SUFFIX
        )));
    }
    if new_owner == dpp.owner_org() {
        return Err(DppError::validation(format!(
            "record {} is already owned by {}",
            dpp.id(),
            new_owner
        )));
    }
    if !dpp.status().is_transferable() {
        return Err(DppError::invalid_transition(
            dpp.id(),
            format!("status {} is not released for transfer", dpp.status()),
        ));
    }
    Ok(())
}

/// Hand the record over to `new_owner`; a `_TransportAlert` suffix is carried into transit.
pub fn ship(dpp: &mut Dpp, new_owner: &str) {
    let transport_alert = dpp.status().carries_transport_alert();
    dpp.set_owner(new_owner);
    dpp.set_status(DppStatus::in_transit(new_owner, transport_alert));
}

/// Checks that `caller` is the designated recipient of an in-transit record.
pub fn ensure_recipient(dpp: &Dpp, caller: &str) -> Result<(), DppError> {
    match dpp.status().recipient() {
        Some(recipient) if recipient == caller && dpp.owner_org() == caller => Ok(()),
        Some(recipient) => Err(DppError::Unauthorized(format!(
            "record {} is in transit to {}, caller is {}",
            dpp.id(),
            recipient,
            caller
        ))),
        None => Err(DppError::invalid_transition(
            dpp.id(),
            format!("status {} is not in transit", dpp.status()),
        )),
    }
}

/// Status after the designated recipient accepts delivery.
pub fn accepted_status(dpp: &Dpp) -> DppStatus {
    DppStatus::AcceptedAtRecipient {
        transport_alert: dpp.status().carries_transport_alert(),
    }
}

/// Status after a transport alert arrives; `None` when the status stays as it is.
pub fn with_transport_alert(status: &DppStatus) -> Option<DppStatus> {
    match status {
        DppStatus::InTransit {
            recipient,
            transport_alert: false,
        } => Some(DppStatus::in_transit(recipient.clone(), true)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_types::{DeviationKind, NewDpp};

    fn record(status: DppStatus) -> Dpp {
        let mut dpp = Dpp::new(
            NewDpp {
                id: "dpp-1".into(),
                product_identifier: "urn:epc:id:sgtin:4012345.011111.1001".into(),
                product_type_id: String::new(),
                manufacturer_site_id: "4012345000009".into(),
                batch: String::new(),
                production_date: String::new(),
                specifications: Vec::new(),
            },
            "Org1MSP",
            Vec::new(),
        );
        dpp.set_status(status);
        dpp
    }

    #[test]
    fn ship_guards() {
        let released = record(DppStatus::Released);
        assert!(ensure_can_ship(&released, "Org1MSP", "Org2MSP").is_ok());
        assert!(matches!(
            ensure_can_ship(&released, "Org9MSP", "Org2MSP"),
            Err(DppError::Unauthorized(_))
        ));
        assert!(matches!(
            ensure_can_ship(&released, "Org1MSP", "Org1MSP"),
            Err(DppError::Validation(_))
        ));
        assert!(matches!(
            ensure_can_ship(&released, "Org1MSP", "Org2MSP_TransportAlert"),
            Err(DppError::Validation(_))
        ));

        for status in [
            DppStatus::Blocked,
            DppStatus::Draft,
            DppStatus::ReleasedWith(DeviationKind::Quality),
            DppStatus::AwaitingMandatoryChecks { open: 1 },
        ] {
            assert!(matches!(
                ensure_can_ship(&record(status), "Org1MSP", "Org2MSP"),
                Err(DppError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn only_an_alert_suffix_is_carried_into_transit() {
        let mut released = record(DppStatus::ReleasedWith(DeviationKind::Transport));
        ship(&mut released, "Org2MSP");
        assert_eq!(released.owner_org(), "Org2MSP");
        assert_eq!(released.status(), &DppStatus::in_transit("Org2MSP", false));

        let mut flagged = record(DppStatus::AcceptedAtRecipient {
            transport_alert: true,
        });
        ship(&mut flagged, "Org3MSP");
        assert_eq!(flagged.status(), &DppStatus::in_transit("Org3MSP", true));

        let mut clean = record(DppStatus::Released);
        ship(&mut clean, "Org2MSP");
        assert_eq!(clean.status(), &DppStatus::in_transit("Org2MSP", false));
    }

    #[test]
    fn alert_is_only_added_once_and_only_in_transit() {
        let plain = DppStatus::in_transit("Org2MSP", false);
        assert_eq!(
            with_transport_alert(&plain),
            Some(DppStatus::in_transit("Org2MSP", true))
        );
        assert_eq!(
            with_transport_alert(&DppStatus::in_transit("Org2MSP", true)),
            None
        );
        assert_eq!(with_transport_alert(&DppStatus::Released), None);
    }

    #[test]
    fn recipient_checks() {
        let mut dpp = record(DppStatus::Released);
        ship(&mut dpp, "Org2MSP");
        assert!(ensure_recipient(&dpp, "Org2MSP").is_ok());
        assert!(matches!(
            ensure_recipient(&dpp, "Org3MSP"),
            Err(DppError::Unauthorized(_))
        ));
        assert!(matches!(
            ensure_recipient(&record(DppStatus::Released), "Org1MSP"),
            Err(DppError::InvalidTransition { .. })
        ));
        assert_eq!(
            accepted_status(&dpp),
            DppStatus::AcceptedAtRecipient {
                transport_alert: false
            }
        );
    }
}
