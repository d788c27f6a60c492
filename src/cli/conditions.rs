// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;
use std::str::FromStr;

use crate::conditions::taxonomy::{methods_for_kind, parameters_for, STANDARD_CONTRACT_TYPES};
use crate::conditions::{
    Comparator, ConditionBuilder, ConditionError, ConditionKind, ContractType, LogicalOperator,
    SelectionChange,
};
use crate::config::GOERLI_CHAIN_ID;

/// Builder inputs shared by commands that compose a condition
#[derive(Args, Debug, Clone)]
pub struct ConditionArgs {
    /// Condition kind (timelock, evm, rpc)
    #[arg(long, default_value = "timelock")]
    pub kind: String,

    /// Comparator (==, >, <, >=, <=, !=)
    #[arg(long, default_value = ">")]
    pub comparator: String,

    /// Expected return value; integers are sent as numbers
    #[arg(long, default_value = "0")]
    pub value: String,

    /// RPC or contract method (defaults to the first one offered)
    #[arg(long)]
    pub method: Option<String>,

    /// Standard contract type for evm conditions (ERC20, ERC721)
    #[arg(long)]
    pub contract_type: Option<String>,

    /// Contract address for evm conditions
    #[arg(long)]
    pub contract_address: Option<String>,

    /// Parameter value, e.g. :userAddress or a token id
    #[arg(long)]
    pub parameter: Option<String>,
}

impl ConditionArgs {
    /// Drive the builder form the way a user would, selector by selector
    pub fn apply(&self, builder: &mut ConditionBuilder) -> Result<(), ConditionError> {
        let kind = ConditionKind::from_str(&self.kind)?;
        builder.select(SelectionChange::Kind(kind))?;
        builder.select(SelectionChange::Comparator(Comparator::from_str(&self.comparator)?))?;
        if let Some(contract_type) = &self.contract_type {
            builder.select(SelectionChange::ContractType(ContractType::from_str(contract_type)?))?;
        }
        if let Some(method) = &self.method {
            match kind {
                ConditionKind::Rpc => {
                    builder.select(SelectionChange::RpcMethod(method.clone()))?;
                }
                ConditionKind::Evm => {
                    builder.select(SelectionChange::ContractMethod(method.clone()))?;
                }
                ConditionKind::Timelock => {}
            }
        }
        builder.set_return_value(self.value.clone());
        if let Some(parameter) = &self.parameter {
            builder.set_parameter_value(parameter.clone());
        }
        if let Some(address) = &self.contract_address {
            builder.set_contract_address(address.clone());
        }
        Ok(())
    }
}

/// Arguments for preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub condition: ConditionArgs,

    /// Chain id for rpc and evm conditions
    #[arg(long, default_value_t = GOERLI_CHAIN_ID)]
    pub chain: u64,

    /// Also append `Timelock > 0` joined with this operator (and, or)
    #[arg(long)]
    pub and_timelock: Option<String>,
}

pub fn preview(args: PreviewArgs) -> Result<()> {
    let mut builder = ConditionBuilder::new(args.chain);
    args.condition.apply(&mut builder)?;
    println!("📝 {}", builder.summary());
    println!("   methods offered: {}", builder.available_methods().join(", "));

    let mut set = builder.add_to(None)?;
    if let Some(operator) = &args.and_timelock {
        let mut timelock = ConditionBuilder::new(args.chain);
        timelock.select(SelectionChange::Comparator(Comparator::Gt))?;
        timelock.set_operator(LogicalOperator::from_str(operator)?);
        set = timelock.add_to(Some(&set))?;
    }

    println!("{}", set);
    println!("{}", set.preview_json());
    Ok(())
}

pub fn print_taxonomy() {
    println!("Condition kinds:");
    for kind in ConditionKind::ALL {
        match kind {
            ConditionKind::Evm => {
                for contract_type in STANDARD_CONTRACT_TYPES {
                    print_methods(kind, &format!("evm/{}", contract_type), *contract_type);
                }
            }
            _ => print_methods(kind, kind.as_str(), STANDARD_CONTRACT_TYPES[0]),
        }
    }

    let comparators: Vec<&str> = Comparator::ALL.iter().map(|c| c.as_str()).collect();
    println!("Comparators: {}", comparators.join(" "));
    let operators: Vec<&str> = LogicalOperator::ALL.iter().map(|o| o.as_str()).collect();
    println!("Operators: {}", operators.join(" "));
}

fn print_methods(kind: ConditionKind, label: &str, contract_type: ContractType) {
    for method in methods_for_kind(kind, contract_type) {
        let parameters = parameters_for(kind, method);
        println!("  {:<13} {}({})", label, method, parameters.join(", "));
    }
}
