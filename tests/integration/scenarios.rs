//! End-to-end gate scenarios over in-process fixtures
//!
//! Each test describes one server behaviour and the outcome the gate must
//! reach for it.

use addresses_deprecation::errors::{AppError, RpcError};
use addresses_deprecation::gate::{Harness, HarnessSettings};
use addresses_deprecation::rpc::{LegacyEmission, SimulatedNode};
use addresses_deprecation::script::catalog::{KEY_1, KEY_2, KEY_3};
use addresses_deprecation::script::{catalog, catalog_of, CatalogScript};
use addresses_deprecation::types::{GateField, GateMode, NodeConfig, ScriptKind};
use anyhow::Result;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Network, PubkeyHash};
use serde_json::{json, Value};

use crate::common::mock_node::{call_failed, script_pubkey_mut, ScriptedNode};

fn p2pkh(key: &[u8]) -> String {
    Address::p2pkh(PubkeyHash::hash(key), Network::Regtest).to_string()
}

fn simulated_pair() -> (SimulatedNode, SimulatedNode) {
    (
        SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest),
        SimulatedNode::new(NodeConfig::legacy_on(), Network::Regtest),
    )
}

fn harness_for(entries: Vec<CatalogScript>) -> Harness {
    Harness::new(HarnessSettings::new(Network::Regtest).with_entries(entries))
}

/// The `scriptPubKey` object of output `index` as `node` decodes `harness`'s probe
fn descriptor_json(harness: &Harness, node: &SimulatedNode, index: usize) -> Result<Value> {
    let built = harness.build_probe()?;
    let decoded = node.decode(&built.hex)?;
    Ok(decoded["vout"][index]["scriptPubKey"].clone())
}

#[tokio::test]
async fn test_scenario_a_single_sig() -> Result<()> {
    let harness = harness_for(catalog_of(ScriptKind::StandardSingleSig));
    let (off, on) = simulated_pair();

    let report = harness.run(&off, &on).await?;
    assert!(report.passed(), "{}", report.to_console());
    assert_eq!(report.outputs_checked, 1);

    let off_spk = descriptor_json(&harness, &off, 0)?;
    assert_eq!(off_spk["type"], "pubkeyhash");
    assert!(off_spk.get("reqSigs").is_none());
    assert!(off_spk.get("addresses").is_none());

    let on_spk = descriptor_json(&harness, &on, 0)?;
    assert_eq!(on_spk["type"], "pubkeyhash");
    assert_eq!(on_spk["reqSigs"], 1);
    assert_eq!(on_spk["addresses"], json!([p2pkh(&KEY_1)]));

    Ok(())
}

#[tokio::test]
async fn test_scenario_b_multisig_addresses_in_key_order() -> Result<()> {
    let harness = harness_for(catalog_of(ScriptKind::StandardMultiSig));
    let (off, on) = simulated_pair();

    let report = harness.run(&off, &on).await?;
    assert!(report.passed(), "{}", report.to_console());

    let on_spk = descriptor_json(&harness, &on, 0)?;
    assert_eq!(on_spk["type"], "multisig");
    assert_eq!(on_spk["reqSigs"], 2);
    assert_eq!(
        on_spk["addresses"],
        json!([p2pkh(&KEY_1), p2pkh(&KEY_2), p2pkh(&KEY_3)])
    );

    Ok(())
}

#[tokio::test]
async fn test_scenario_b_reordered_addresses_violate() -> Result<()> {
    let harness = harness_for(catalog_of(ScriptKind::StandardMultiSig));
    let off = SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest);
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, mut decoded| {
        let spk = script_pubkey_mut(&mut decoded, 0);
        if let Some(Value::Array(addresses)) = spk.get_mut("addresses") {
            addresses.reverse();
        }
        Ok(decoded)
    });

    let report = harness.run(&off, &on).await?;
    let violations: Vec<_> = report.violations_for(NodeConfig::legacy_on()).collect();
    assert_eq!(violations.len(), 1, "{}", report.to_console());
    assert_eq!(violations[0].field, GateField::Addresses);
    assert_eq!(violations[0].kind, ScriptKind::StandardMultiSig);

    Ok(())
}

#[tokio::test]
async fn test_scenario_c_empty_derivation_allowed() -> Result<()> {
    let harness = harness_for(catalog_of(ScriptKind::NonStandard));
    let off = SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest);
    // Older servers report an empty derivation for non-standard outputs
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, mut decoded| {
        for index in 0..3 {
            let spk = script_pubkey_mut(&mut decoded, index);
            spk.insert("reqSigs".to_string(), json!(0));
            spk.insert("addresses".to_string(), json!([]));
        }
        Ok(decoded)
    });

    let report = harness.run(&off, &on).await?;
    assert!(report.passed(), "{}", report.to_console());

    Ok(())
}

#[tokio::test]
async fn test_fabricated_nonstandard_address_violates() -> Result<()> {
    let harness = harness_for(catalog_of(ScriptKind::NonStandard));
    let off = SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest);
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, mut decoded| {
        let spk = script_pubkey_mut(&mut decoded, 1);
        spk.insert("reqSigs".to_string(), json!(1));
        spk.insert("addresses".to_string(), json!([p2pkh(&[0u8; 33])]));
        Ok(decoded)
    });

    let report = harness.run(&off, &on).await?;
    assert!(!report.passed());
    assert!(report
        .violations
        .iter()
        .all(|v| v.output_index == 1 && v.kind == ScriptKind::NonStandard));
    let fields: Vec<_> = report.violations.iter().map(|v| v.field).collect();
    assert!(fields.contains(&GateField::RequiredSignatures));
    assert!(fields.contains(&GateField::Addresses));

    Ok(())
}

#[tokio::test]
async fn test_flag_off_leak_detected_for_every_kind() -> Result<()> {
    let harness = harness_for(catalog());
    let off = ScriptedNode::new(NodeConfig::legacy_off(), |_, mut decoded| {
        for index in 0..5 {
            let spk = script_pubkey_mut(&mut decoded, index);
            spk.insert("reqSigs".to_string(), json!(0));
            spk.insert("addresses".to_string(), json!([]));
        }
        Ok(decoded)
    });
    let on = SimulatedNode::new(NodeConfig::legacy_on(), Network::Regtest);

    let report = harness.run(&off, &on).await?;
    // Presence alone is the violation, whatever the value
    assert_eq!(report.violations_for(NodeConfig::legacy_off()).count(), 10);
    assert_eq!(report.violations_for(NodeConfig::legacy_on()).count(), 0);
    for kind in [
        ScriptKind::StandardSingleSig,
        ScriptKind::StandardMultiSig,
        ScriptKind::NonStandard,
    ] {
        assert!(report.violations.iter().any(|v| v.kind == kind));
    }

    Ok(())
}

#[tokio::test]
async fn test_unstable_decode_fails_idempotence() -> Result<()> {
    let harness = harness_for(catalog());
    let off = SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest);
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |call, mut decoded| {
        if call > 0 {
            let spk = script_pubkey_mut(&mut decoded, 1);
            if let Some(Value::Array(addresses)) = spk.get_mut("addresses") {
                addresses.swap(0, 1);
            }
        }
        Ok(decoded)
    });

    let report = harness.run(&off, &on).await?;
    assert_eq!(on.calls(), 2);
    let violations: Vec<_> = report.violations_for(NodeConfig::legacy_on()).collect();
    assert_eq!(violations.len(), 1, "{}", report.to_console());
    assert_eq!(violations[0].field, GateField::Descriptor);
    assert_eq!(violations[0].output_index, 1);

    Ok(())
}

#[tokio::test]
async fn test_idempotence_probe_can_be_disabled() -> Result<()> {
    let settings = HarnessSettings::new(Network::Regtest).with_idempotence(false);
    let (off, _) = simulated_pair();
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, decoded| Ok(decoded));

    let report = Harness::new(settings).run(&off, &on).await?;
    assert!(report.passed());
    assert_eq!(on.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn test_reordered_outputs_abort_run() -> Result<()> {
    let harness = harness_for(catalog());
    let (off, _) = simulated_pair();
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, mut decoded| {
        if let Some(vout) = decoded["vout"].as_array_mut() {
            vout.swap(0, 1);
        }
        Ok(decoded)
    });

    let result = harness.run(&off, &on).await;
    assert!(matches!(
        result,
        Err(AppError::Rpc(RpcError::OutputOrderMismatch { position: 0, .. }))
    ));

    Ok(())
}

#[tokio::test]
async fn test_dropped_output_aborts_run() -> Result<()> {
    let harness = harness_for(catalog());
    let (off, _) = simulated_pair();
    let on = ScriptedNode::new(NodeConfig::legacy_on(), |_, mut decoded| {
        if let Some(vout) = decoded["vout"].as_array_mut() {
            vout.pop();
        }
        Ok(decoded)
    });

    let result = harness.run(&off, &on).await;
    assert!(matches!(
        result,
        Err(AppError::Rpc(RpcError::OutputCountMismatch {
            expected: 5,
            actual: 4
        }))
    ));

    Ok(())
}

#[tokio::test]
async fn test_transport_failure_aborts_run() -> Result<()> {
    let harness = harness_for(catalog());
    let off = ScriptedNode::new(NodeConfig::legacy_off(), |_, _| {
        Err(call_failed("Work queue depth exceeded"))
    });
    let on = SimulatedNode::new(NodeConfig::legacy_on(), Network::Regtest);

    let result = harness.run(&off, &on).await;
    assert!(matches!(
        result,
        Err(AppError::Rpc(RpcError::CallFailed { .. }))
    ));

    Ok(())
}

#[tokio::test]
async fn test_retired_protocol_rejects_any_legacy_field() -> Result<()> {
    let settings = HarnessSettings::new(Network::Regtest).with_mode(GateMode::Retired);
    let (off, on) = simulated_pair();

    let report = Harness::new(settings.clone()).run(&off, &on).await?;
    assert_eq!(report.violations_for(NodeConfig::legacy_on()).count(), 4);

    let on = SimulatedNode::with_emission(
        NodeConfig::legacy_on(),
        Network::Regtest,
        LegacyEmission::Never,
    );
    let report = Harness::new(settings).run(&off, &on).await?;
    assert!(report.passed(), "{}", report.to_console());
    assert_eq!(report.mode, GateMode::Retired);

    Ok(())
}
