use addresses_deprecation::errors::RpcError;
use addresses_deprecation::rpc::{LegacyEmission, NodeHandle, SimulatedNode};
use addresses_deprecation::script::catalog::KEY_1;
use addresses_deprecation::script::CatalogScript;
use addresses_deprecation::transaction::{build, outputs_for};
use addresses_deprecation::types::{NodeConfig, ScriptKind};
use anyhow::Result;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, Network, ScriptBuf, ScriptHash, WPubkeyHash};
use serde_json::json;

fn entry(label: &'static str, expected_type: &'static str, script: ScriptBuf) -> CatalogScript {
    CatalogScript {
        kind: ScriptKind::StandardSingleSig,
        label,
        expected_type,
        script,
    }
}

fn pay_to_pubkey(key: &[u8; 33]) -> ScriptBuf {
    let mut bytes = vec![0x21];
    bytes.extend_from_slice(key);
    bytes.push(0xac);
    ScriptBuf::from_bytes(bytes)
}

/// Outputs every fixture can derive exactly one address from
fn single_destination_entries() -> Vec<CatalogScript> {
    vec![
        entry(
            "p2sh",
            "scripthash",
            ScriptBuf::new_p2sh(&ScriptHash::hash(&[0x51])),
        ),
        entry(
            "p2wpkh",
            "witness_v0_keyhash",
            ScriptBuf::new_p2wpkh(&WPubkeyHash::hash(&KEY_1)),
        ),
        entry(
            "p2pk",
            "pubkey",
            pay_to_pubkey(&KEY_1),
        ),
    ]
}

#[tokio::test]
async fn test_decodes_single_destination_templates() -> Result<()> {
    let entries = single_destination_entries();
    let built = build(&outputs_for(&entries, Amount::from_sat(5_000)))?;
    let node = SimulatedNode::new(NodeConfig::legacy_on(), Network::Regtest);

    let decoded = node.decode_raw_transaction(&built.hex).await?;
    let vout = decoded["vout"].as_array().expect("vout");
    assert_eq!(vout.len(), entries.len());

    for (output, entry) in vout.iter().zip(&entries) {
        let spk = &output["scriptPubKey"];
        assert_eq!(spk["type"], entry.expected_type, "{}", entry.label);
        assert_eq!(spk["hex"], hex::encode(entry.script.as_bytes()));
        assert_eq!(spk["reqSigs"], 1, "{}", entry.label);
        assert_eq!(output["value"], json!(0.00005));
    }

    let p2sh = Address::from_script(&entries[0].script, Network::Regtest)?.to_string();
    assert_eq!(vout[0]["scriptPubKey"]["address"], p2sh);
    assert_eq!(vout[0]["scriptPubKey"]["addresses"], json!([p2sh]));
    assert!(vout[2]["scriptPubKey"].get("address").is_none());

    Ok(())
}

#[tokio::test]
async fn test_legacy_off_keeps_single_address() -> Result<()> {
    let entries = single_destination_entries();
    let built = build(&outputs_for(&entries, Amount::from_sat(5_000)))?;
    let node = SimulatedNode::new(NodeConfig::legacy_off(), Network::Regtest);

    let decoded = node.decode_raw_transaction(&built.hex).await?;
    let wpkh = Address::from_script(&entries[1].script, Network::Regtest)?.to_string();
    assert_eq!(decoded["vout"][1]["scriptPubKey"]["address"], wpkh);
    for output in decoded["vout"].as_array().expect("vout") {
        assert!(output["scriptPubKey"].get("reqSigs").is_none());
        assert!(output["scriptPubKey"].get("addresses").is_none());
    }

    Ok(())
}

#[tokio::test]
async fn test_addresses_follow_network() -> Result<()> {
    let built = build(&outputs_for(
        &addresses_deprecation::script::catalog(),
        Amount::from_sat(1_000),
    ))?;
    let node = SimulatedNode::with_emission(
        NodeConfig::legacy_off(),
        Network::Bitcoin,
        LegacyEmission::Always,
    );

    let decoded = node.decode_raw_transaction(&built.hex).await?;
    assert_eq!(
        decoded["vout"][0]["scriptPubKey"]["addresses"],
        json!(["1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"])
    );

    Ok(())
}

#[tokio::test]
async fn test_truncated_transaction_is_rejected() -> Result<()> {
    let built = build(&outputs_for(
        &addresses_deprecation::script::catalog(),
        Amount::from_sat(1_000),
    ))?;
    let node = SimulatedNode::new(NodeConfig::legacy_on(), Network::Regtest);

    let truncated = &built.hex[..built.hex.len() - 8];
    match node.decode_raw_transaction(truncated).await {
        Err(RpcError::CallFailed { method, message }) => {
            assert_eq!(method, "decoderawtransaction");
            assert!(message.starts_with("TX decode failed"));
        }
        other => anyhow::bail!("expected decode failure, got {:?}", other),
    }

    Ok(())
}
