use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::types::{ElementRef, Locator, LocatorStrategy, Position, Size, TouchAction};
use keyguard_core::{DeviceControl, UiDriver};

use crate::device::AdbDevice;
use crate::hierarchy::{parse_nodes, UiNode};

const DUMP_PATH: &str = "/sdcard/window_dump.xml";

/// UI layer built on `uiautomator dump` and `input`.
///
/// Element refs point into the most recent dump; every lookup takes a fresh one.
pub struct AdbUi {
    device: Arc<AdbDevice>,
    snapshot: Mutex<Vec<UiNode>>,
}

impl AdbUi {
    pub fn new(device: Arc<AdbDevice>) -> Self {
        Self {
            device,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    async fn refresh(&self, locator: &Locator) -> UnlockResult<Vec<ElementRef>> {
        self.device.shell(&["uiautomator", "dump", DUMP_PATH]).await?;
        let xml = self.device.shell(&["cat", DUMP_PATH]).await?;
        let nodes = parse_nodes(&xml);
        tracing::debug!("uiautomator dump returned {} nodes", nodes.len());

        let matches = matching(&nodes, locator);
        *self.lock_snapshot()? = nodes;
        Ok(matches)
    }

    fn node(&self, element: &ElementRef) -> UnlockResult<UiNode> {
        let index = element_index(element)
            .ok_or_else(|| UnlockError::ElementNotFound(element.0.clone()))?;
        self.lock_snapshot()?
            .get(index)
            .cloned()
            .ok_or_else(|| UnlockError::ElementNotFound(element.0.clone()))
    }

    fn lock_snapshot(&self) -> UnlockResult<std::sync::MutexGuard<'_, Vec<UiNode>>> {
        self.snapshot
            .lock()
            .map_err(|_| UnlockError::device("UI snapshot lock poisoned"))
    }

    async fn motion(&self, kind: &str, pos: Position) -> UnlockResult<()> {
        let (x, y) = (pos.x.to_string(), pos.y.to_string());
        self.device
            .shell(&["input", "motionevent", kind, &x, &y])
            .await?;
        Ok(())
    }
}

fn matching(nodes: &[UiNode], locator: &Locator) -> Vec<ElementRef> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| match locator.strategy {
            LocatorStrategy::Id => node.resource_id == locator.selector,
        })
        .map(|(i, _)| ElementRef(format!("node-{i}")))
        .collect()
}

fn element_index(element: &ElementRef) -> Option<usize> {
    element.0.strip_prefix("node-")?.parse().ok()
}

#[async_trait]
impl UiDriver for AdbUi {
    async fn find_element(&self, locator: &Locator) -> UnlockResult<Option<ElementRef>> {
        Ok(self.refresh(locator).await?.into_iter().next())
    }

    async fn find_elements(&self, locator: &Locator) -> UnlockResult<Vec<ElementRef>> {
        self.refresh(locator).await
    }

    async fn get_attribute(&self, name: &str, element: &ElementRef) -> UnlockResult<String> {
        let node = self.node(element)?;
        match name {
            "text" => Ok(node.text),
            "resource-id" => Ok(node.resource_id),
            other => Err(UnlockError::device(format!("Unsupported attribute '{other}'"))),
        }
    }

    async fn click(&self, element: &ElementRef) -> UnlockResult<()> {
        let center = self.node(element)?.bounds.center();
        let (x, y) = (center.x.to_string(), center.y.to_string());
        self.device.shell(&["input", "tap", &x, &y]).await?;
        Ok(())
    }

    async fn get_location(&self, element: &ElementRef) -> UnlockResult<Position> {
        Ok(self.node(element)?.bounds.location())
    }

    async fn get_size(&self, element: &ElementRef) -> UnlockResult<Size> {
        Ok(self.node(element)?.bounds.size())
    }

    async fn perform_touch(&self, actions: &[TouchAction]) -> UnlockResult<()> {
        let mut last: Option<Position> = None;
        for action in actions {
            match action {
                TouchAction::Press { x, y, .. } => {
                    let pos = Position::new(*x, *y);
                    self.motion("DOWN", pos).await?;
                    last = Some(pos);
                }
                TouchAction::MoveTo { x, y, .. } => {
                    let pos = Position::new(*x, *y);
                    self.motion("MOVE", pos).await?;
                    last = Some(pos);
                }
                TouchAction::Release => {
                    let pos = last.ok_or_else(|| {
                        UnlockError::device("Release without a preceding press")
                    })?;
                    self.motion("UP", pos).await?;
                }
            }
        }
        Ok(())
    }
}
