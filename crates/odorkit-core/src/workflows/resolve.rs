use crate::core::utils::identifiers::IdentifierKind;
use crate::engine::error::EngineError;
use crate::engine::lookup::CompoundLookup;
use crate::engine::progress::ProgressReporter;
use crate::engine::resolver::{ResolutionReport, Resolver};
use tracing::{info, instrument};

/// Resolves `identifiers` to CIDs. `kind` forces every identifier to be read as that kind.
#[instrument(skip_all, name = "resolve_workflow", fields(count = identifiers.len()))]
pub fn run<L, S>(
    identifiers: &[S],
    kind: Option<IdentifierKind>,
    lookup: &L,
    reporter: &ProgressReporter,
) -> Result<ResolutionReport, EngineError>
where
    L: CompoundLookup + ?Sized,
    S: AsRef<str>,
{
    info!("Resolving {} identifier(s).", identifiers.len());
    let report = reporter.phase("Identifier Resolution", || {
        let report = Resolver::new(lookup)
            .with_kind(kind)
            .resolve(identifiers, reporter)?;
        for entry in report.unresolved() {
            reporter.message(format!("'{}': {}", entry.identifier, entry.resolution));
        }
        Ok::<_, EngineError>(report)
    })?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lookup::Namespace;
    use crate::engine::lookup::testing::{FakeLookup, cid};
    use crate::engine::progress::Progress;
    use crate::engine::progress::testing::recording_reporter;
    use crate::engine::resolver::{Resolution, Unresolved};

    #[test]
    fn reports_unresolved_identifiers_as_messages() {
        let lookup = FakeLookup::new()
            .with(Namespace::Name, "vanillin", &[1183])
            .with(Namespace::Name, "carvone", &[7439, 439570]);
        let (reporter, events) = recording_reporter();

        let report = run(&["vanillin", "carvone", "nothing"], None, &lookup, &reporter).unwrap();

        assert_eq!(report.entries[0].resolution, Resolution::Resolved(cid(1183)));
        assert!(matches!(
            report.entries[1].resolution,
            Resolution::Unresolved(Unresolved::MultipleMatches(ref c)) if c.len() == 2
        ));
        let events = events.lock().unwrap();
        assert_eq!(
            events.first(),
            Some(&Progress::PhaseStart {
                name: "Identifier Resolution"
            })
        );
        let messages: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                Progress::Message(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("'carvone'"));
        assert_eq!(events.last(), Some(&Progress::PhaseFinish));
    }

    #[test]
    fn forced_kind_is_applied_to_every_identifier() {
        let lookup = FakeLookup::new().with(Namespace::Name, "1183", &[1183]);
        let report = run(
            &["1183"],
            Some(IdentifierKind::Name),
            &lookup,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(report.entries[0].kind, IdentifierKind::Name);
        assert_eq!(report.cids(), vec![cid(1183)]);
    }
}
