//! Offline fallback replies.
//!
//! Keyword-matched canned responses shown when the chat endpoint is
//! unreachable, so the user always sees an answer instead of a stuck
//! streaming indicator. The keyword/response table is product content
//! carried over from the kite dashboard; treat it as configuration data.

/// Greeting seeded into every new session.
pub const WELCOME_MESSAGE: &str =
    "你好！我是 Kite 的 Kubernetes 助手，可以帮你解答部署、配置、排障等问题。请描述你的问题。";

const POD_STATUS_REPLY: &str = "关于Pod状态问题，常见的排查步骤：\n\n1. **查看Pod状态**：`kubectl get pods -o wide`\n2. **查看详细信息**：`kubectl describe pod <pod-name>`\n3. **查看日志**：`kubectl logs <pod-name>`\n4. **常见问题**：\n   • ImagePullBackOff：镜像拉取失败\n   • CrashLoopBackOff：容器启动后崩溃\n   • Pending：资源不足或调度失败\n\n需要具体的错误信息才能进一步诊断。";

const DEPLOY_REPLY: &str = "Kubernetes应用部署的几种方式：\n\n1. **Deployment**（推荐）：\n```yaml\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: my-app\nspec:\n  replicas: 3\n  selector:\n    matchLabels:\n      app: my-app\n  template:\n    metadata:\n      labels:\n        app: my-app\n    spec:\n      containers:\n      - name: app\n        image: nginx:latest\n```\n\n2. **使用kubectl**：`kubectl create deployment my-app --image=nginx`\n3. **使用Helm**：更复杂的应用部署\n\n需要更具体的部署需求吗？";

const SERVICE_REPLY: &str = "Kubernetes Service类型及用途：\n\n1. **ClusterIP**（默认）：集群内部访问\n2. **NodePort**：通过节点端口访问\n3. **LoadBalancer**：云平台负载均衡器\n4. **ExternalName**：外部服务映射\n\n**示例配置**：\n```yaml\napiVersion: v1\nkind: Service\nmetadata:\n  name: my-service\nspec:\n  selector:\n    app: my-app\n  ports:\n  - port: 80\n    targetPort: 8080\n  type: ClusterIP\n```\n\n你需要哪种类型的Service配置？";

const STORAGE_REPLY: &str = "Kubernetes存储解决方案：\n\n1. **Volume类型**：\n   • emptyDir：临时存储\n   • hostPath：主机路径\n   • configMap/secret：配置存储\n   • persistentVolumeClaim：持久化存储\n\n2. **PV和PVC**：\n```yaml\n# PersistentVolume\napiVersion: v1\nkind: PersistentVolume\nmetadata:\n  name: my-pv\nspec:\n  capacity:\n    storage: 10Gi\n  accessModes:\n  - ReadWriteOnce\n  hostPath:\n    path: /data\n```\n\n需要配置哪种存储类型？";

const NETWORK_REPLY: &str = "Kubernetes网络配置：\n\n1. **Ingress**：HTTP/HTTPS路由\n```yaml\napiVersion: networking.k8s.io/v1\nkind: Ingress\nmetadata:\n  name: my-ingress\nspec:\n  rules:\n  - host: example.com\n    http:\n      paths:\n      - path: /\n        pathType: Prefix\n        backend:\n          service:\n            name: my-service\n            port:\n              number: 80\n```\n\n2. **NetworkPolicy**：网络安全策略\n3. **DNS**：服务发现\n\n具体需要配置什么网络功能？";

/// Returns a canned reply for the given user input.
///
/// Matching is case-insensitive on the input; the first matching topic
/// wins, and anything else gets the generic template interpolating the
/// question.
pub fn fallback_reply(input: &str) -> String {
    let lowered = input.to_lowercase();

    if lowered.contains("pod") && lowered.contains("状态") {
        return POD_STATUS_REPLY.to_string();
    }
    if lowered.contains("部署") || lowered.contains("deploy") {
        return DEPLOY_REPLY.to_string();
    }
    if lowered.contains("service") || lowered.contains("服务") {
        return SERVICE_REPLY.to_string();
    }
    if lowered.contains("存储") || lowered.contains("volume") || lowered.contains("pv") {
        return STORAGE_REPLY.to_string();
    }
    if lowered.contains("网络") || lowered.contains("ingress") {
        return NETWORK_REPLY.to_string();
    }

    format!(
        "我理解你在询问关于\"{input}\"的问题。\n\n作为Kubernetes助手，我可以帮你解答：\n• 应用部署和管理\n• Pod、Service、Ingress配置\n• 存储和网络问题\n• 故障排查和最佳实践\n• YAML配置文件编写\n• kubectl命令使用\n\n请详细描述你遇到的具体问题，我会提供更精准的帮助！"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_status_needs_both_keywords() {
        assert_eq!(fallback_reply("Pod 状态异常"), POD_STATUS_REPLY);
        // "pod" alone falls through to the generic template.
        assert!(fallback_reply("pod broken").contains("pod broken"));
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        assert_eq!(fallback_reply("How to DEPLOY my app"), DEPLOY_REPLY);
        assert_eq!(fallback_reply("Service 不通"), SERVICE_REPLY);
    }

    #[test]
    fn test_first_match_wins() {
        // Both deploy and service keywords present; deploy is checked first.
        assert_eq!(fallback_reply("deploy a service"), DEPLOY_REPLY);
    }

    #[test]
    fn test_storage_and_network_topics() {
        assert_eq!(fallback_reply("pvc 怎么配"), STORAGE_REPLY);
        assert_eq!(fallback_reply("ingress 404"), NETWORK_REPLY);
    }

    #[test]
    fn test_generic_reply_interpolates_question() {
        let reply = fallback_reply("什么是 CRD");
        assert!(reply.contains("什么是 CRD"));
        assert!(reply.contains("kubectl"));
    }
}
