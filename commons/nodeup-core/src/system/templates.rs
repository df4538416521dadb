use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;

use crate::client::ClusterView;
use crate::error::{Error, Result};
use crate::file::ConfigUnit;
use crate::node::NodeView;

pub const KUBELET: &str = "kubelet.service";
pub const CONTAINERD: &str = "containerd.service";

const ARTIFACT_MODE: u32 = 0o640;

/// Values visible to every template as `node` and `cluster`.
#[derive(Clone, Debug, Serialize)]
pub struct RenderContext<'a> {
    pub node: NodeView,
    pub cluster: ClusterView<'a>,
}

/// An artifact on disk and the services that must restart when it changes.
#[derive(Debug)]
pub struct ConfigTemplate {
    pub path: &'static str,
    pub source: &'static str,
    pub mode: u32,
    pub services: &'static [&'static str],
    /// Artifacts that don't apply to this node are neither rendered nor
    /// touched on disk.
    pub applies: fn(&NodeView) -> bool,
}

fn always(_: &NodeView) -> bool {
    true
}

fn containerd_only(node: &NodeView) -> bool {
    node.container_runtime == "containerd"
}

pub static TEMPLATES: &[ConfigTemplate] = &[
    ConfigTemplate {
        path: "/var/lib/kubelet/kubeconfig",
        source: include_str!("../../templates/kubeconfig.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    ConfigTemplate {
        path: "/etc/systemd/system/kubelet.service",
        source: include_str!("../../templates/kubelet.service.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    ConfigTemplate {
        path: "/etc/systemd/system/kubelet.service.d/10-kubelet-args.conf",
        source: include_str!("../../templates/kubelet-args.conf.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    // renders empty when the instance type is unknown, so the file is never created
    ConfigTemplate {
        path: "/etc/systemd/system/kubelet.service.d/20-max-pods.conf",
        source: include_str!("../../templates/max-pods.conf.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    ConfigTemplate {
        path: "/etc/systemd/system/kubelet.service.d/30-kube-reserved.conf",
        source: include_str!("../../templates/kube-reserved.conf.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    ConfigTemplate {
        path: "/etc/kubernetes/pki/ca.crt",
        source: include_str!("../../templates/ca.crt.j2"),
        mode: ARTIFACT_MODE,
        services: &[KUBELET],
        applies: always,
    },
    ConfigTemplate {
        path: "/etc/containerd/config.toml",
        source: include_str!("../../templates/containerd.toml.j2"),
        mode: ARTIFACT_MODE,
        services: &[CONTAINERD],
        applies: containerd_only,
    },
];

pub struct Renderer {
    env: Environment<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.add_filter("b64decode", b64decode);
        Self { env }
    }

    pub fn render(
        &self,
        template: &ConfigTemplate,
        ctx: &RenderContext<'_>,
    ) -> Result<ConfigUnit> {
        let content = self
            .env
            .render_named_str(template.path, template.source, ctx)
            .map_err(|source| Error::Render {
                path: PathBuf::from(template.path),
                source,
            })?;
        Ok(ConfigUnit {
            path: PathBuf::from(template.path),
            content: content.into_bytes(),
            mode: template.mode,
        })
    }
}

fn b64decode(value: String) -> Result<String, minijinja::Error> {
    let bytes = STANDARD.decode(value.trim()).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "invalid base64 data")
            .with_source(e)
    })?;
    String::from_utf8(bytes).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "decoded data is not UTF-8")
            .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> NodeView {
        NodeView {
            instance_id: "i-1234".into(),
            instance_type: "c4.large".into(),
            private_ip: "10.6.28.199".into(),
            private_dns_name: "ip-10-6-28-199.us-west-2.compute.internal".into(),
            region: "us-east-1".into(),
            container_runtime: "docker".into(),
            cluster_name: "aws-om-cluster".into(),
            max_pods: 18,
            reserved_cpu: "70m".into(),
            reserved_memory: "960Mi".into(),
            cluster_dns: "172.20.0.10".into(),
            labels: vec!["node-role.kubernetes.io/worker=true".into()],
            taints: vec![],
            pause_image: "602401143452.dkr.ecr.us-east-1.amazonaws.com/eks/pause-amd64:3.1"
                .into(),
        }
    }

    fn cluster() -> ClusterView<'static> {
        ClusterView {
            name: "aws-om-cluster",
            endpoint: "https://74770F6B05F7A8FB0F02CFB5F7AF530C.yl4.us-west-2.eks.amazonaws.com",
            certificate_authority: "dGhpc2lzdGhlY2VydGRhdGE=",
        }
    }

    fn render(path: &str, node: NodeView) -> String {
        let template = TEMPLATES.iter().find(|t| t.path == path).unwrap();
        let ctx = RenderContext {
            node,
            cluster: cluster(),
        };
        let unit = Renderer::new().render(template, &ctx).unwrap();
        assert_eq!(unit.mode, 0o640);
        String::from_utf8(unit.content).unwrap()
    }

    #[test]
    fn kubeconfig_points_at_the_cluster() {
        let rendered = render("/var/lib/kubelet/kubeconfig", node());
        assert!(rendered.starts_with("apiVersion: v1\nkind: Config\n"));
        assert!(rendered.contains("- name: aws-om-cluster\n"));
        assert!(rendered.contains(
            "    server: https://74770F6B05F7A8FB0F02CFB5F7AF530C.yl4.us-west-2.eks.amazonaws.com\n"
        ));
        assert!(rendered.contains("    certificate-authority-data: dGhpc2lzdGhlY2VydGRhdGE=\n"));
        assert!(rendered.ends_with("        - \"aws-om-cluster\"\n"));
    }

    #[test]
    fn kubelet_args_for_docker() {
        let rendered = render(
            "/etc/systemd/system/kubelet.service.d/10-kubelet-args.conf",
            node(),
        );
        assert_eq!(
            rendered,
            "[Service]\nEnvironment='KUBELET_ARGS=--node-ip=10.6.28.199 --cluster-dns=172.20.0.10 \
             --pod-infra-container-image=602401143452.dkr.ecr.us-east-1.amazonaws.com/eks/pause-amd64:3.1 \
             --container-runtime=docker --node-labels=node-role.kubernetes.io/worker=true'\n"
        );
    }

    #[test]
    fn kubelet_args_for_containerd_with_taints() {
        let mut n = node();
        n.container_runtime = "containerd".into();
        n.labels.push("nvidia-gpu=K80".into());
        n.taints = vec!["dedicated=foo:NoSchedule".into(), "gpu=true:NoExecute".into()];
        let rendered = render(
            "/etc/systemd/system/kubelet.service.d/10-kubelet-args.conf",
            n,
        );
        assert!(rendered.contains(
            " --container-runtime=remote --container-runtime-endpoint=unix:///run/containerd/containerd.sock"
        ));
        assert!(rendered.contains(" --node-labels=node-role.kubernetes.io/worker=true,nvidia-gpu=K80"));
        assert!(rendered.contains(
            " --register-with-taints=dedicated=foo:NoSchedule,gpu=true:NoExecute'\n"
        ));
    }

    #[test]
    fn max_pods_drop_in_is_empty_when_unknown() {
        let path = "/etc/systemd/system/kubelet.service.d/20-max-pods.conf";
        assert_eq!(
            render(path, node()),
            "[Service]\nEnvironment='KUBELET_MAX_PODS=--max-pods=18'\n"
        );
        let mut n = node();
        n.max_pods = 0;
        assert_eq!(render(path, n), "");
    }

    #[test]
    fn kube_reserved_drop_in_needs_cpu_and_memory() {
        let path = "/etc/systemd/system/kubelet.service.d/30-kube-reserved.conf";
        assert_eq!(
            render(path, node()),
            "[Service]\nEnvironment='KUBELET_KUBE_RESERVED=--kube-reserved=cpu=70m,memory=960Mi'\n"
        );
        let mut n = node();
        n.reserved_cpu.clear();
        assert_eq!(render(path, n), "");
    }

    #[test]
    fn ca_certificate_is_decoded() {
        assert_eq!(render("/etc/kubernetes/pki/ca.crt", node()), "thisisthecertdata\n");
    }

    #[test]
    fn kubelet_unit_follows_the_runtime() {
        let mut n = node();
        n.container_runtime = "containerd".into();
        let rendered = render("/etc/systemd/system/kubelet.service", n);
        assert!(rendered.contains("After=containerd.service\nRequires=containerd.service\n"));
        assert!(rendered.ends_with("WantedBy=multi-user.target\n"));
    }

    #[test]
    fn containerd_config_only_applies_to_containerd() {
        let template = TEMPLATES
            .iter()
            .find(|t| t.path == "/etc/containerd/config.toml")
            .unwrap();
        let mut n = node();
        assert!(!(template.applies)(&n));
        n.container_runtime = "containerd".into();
        assert!((template.applies)(&n));
        let rendered = render("/etc/containerd/config.toml", n);
        assert!(rendered.contains(
            "sandbox_image = \"602401143452.dkr.ecr.us-east-1.amazonaws.com/eks/pause-amd64:3.1\""
        ));
    }

    #[test]
    fn invalid_certificate_data_fails_rendering() {
        let template = TEMPLATES
            .iter()
            .find(|t| t.path == "/etc/kubernetes/pki/ca.crt")
            .unwrap();
        let ctx = RenderContext {
            node: node(),
            cluster: ClusterView {
                certificate_authority: "!!not base64!!",
                ..cluster()
            },
        };
        let err = Renderer::new().render(template, &ctx).unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
        assert!(err.to_string().contains("/etc/kubernetes/pki/ca.crt"));
    }
}
