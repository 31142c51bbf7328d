// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::api::{ApiClient, Transport};
use crate::error::ActionOutcome;
use crate::forms::ClassifierForm;
use crate::refresh::{RefreshBus, Resource};
use crate::utils::pretty_table;

use super::report;

/// Categories and brands; `resource` is one of the two.
pub fn handle<T: Transport>(
    api: &ApiClient<T>,
    bus: &RefreshBus,
    resource: Resource,
    m: &clap::ArgMatches,
) -> Result<()> {
    let path = resource.name();
    match m.subcommand() {
        Some(("add", sub)) => {
            let form = ClassifierForm {
                name: sub.get_one::<String>("name").cloned().unwrap_or_default(),
                description: sub.get_one::<String>("description").cloned(),
            };
            form.validate().into_result()?;
            let result = api.create_classifier(path, form.to_payload());
            report(ActionOutcome::from_api(
                &result,
                &format!("Eklendi: {}", form.name.trim()),
            ))?;
            bus.publish(resource);
        }
        Some(("list", _)) => {
            let items = api
                .classifiers(path)
                .map_err(|e| anyhow!(e.user_message()))?;
            let data = items
                .into_iter()
                .map(|c| vec![c.name, c.description.unwrap_or_default(), c.id])
                .collect();
            println!("{}", pretty_table(&["Ad", "Açıklama", "ID"], data));
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            report(ActionOutcome::from_api(
                &api.delete_classifier(path, id),
                "Silindi",
            ))?;
            bus.publish(resource);
        }
        _ => {}
    }
    Ok(())
}
